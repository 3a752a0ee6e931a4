use pulse_core::PulseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("NewsAPI error ({code}): {message}")]
    Api { code: String, message: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<NewsError> for PulseError {
    fn from(err: NewsError) -> Self {
        PulseError::Upstream(err.to_string())
    }
}
