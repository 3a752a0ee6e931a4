use pulse_core::PulseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No data found for {0}")]
    NoData(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<MarketDataError> for PulseError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::InvalidResponse(msg) => PulseError::InvalidResponse(msg),
            other => PulseError::Upstream(other.to_string()),
        }
    }
}
