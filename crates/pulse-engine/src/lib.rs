//! Market pulse pipeline: momentum, news, model classification, and the
//! orchestrator that strings them together per request.

pub mod classifier;
pub mod health;
pub mod momentum;
pub mod news;
pub mod orchestrator;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classifier::{build_prompt, parse_pulse_response, PulseClassifier};
pub use health::HealthReporter;
pub use momentum::MomentumCalculator;
pub use news::NewsFetcher;
pub use orchestrator::MarketPulseOrchestrator;
