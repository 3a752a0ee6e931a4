use pulse_core::PulseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model returned no text")]
    EmptyResponse,
}

pub type LlmResult<T> = Result<T, LlmError>;

impl From<LlmError> for PulseError {
    fn from(err: LlmError) -> Self {
        PulseError::Upstream(err.to_string())
    }
}
