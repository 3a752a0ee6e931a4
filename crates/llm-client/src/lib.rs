pub mod error;
pub mod gemini;
pub mod groq;

pub use error::{LlmError, LlmResult};
pub use gemini::GeminiClient;
pub use groq::GroqClient;

use std::time::Duration;

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
