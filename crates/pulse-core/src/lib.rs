pub mod error;
pub mod momentum;
pub mod traits;
pub mod types;

pub use error::*;
pub use momentum::compute_momentum;
pub use traits::*;
pub use types::*;
