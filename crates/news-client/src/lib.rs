pub mod error;
pub mod newsapi;

pub use error::NewsError;
pub use newsapi::NewsApiClient;
