use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Ticker '{0}' not found")]
    NotFound(String),

    #[error("Insufficient data for momentum calculation")]
    InsufficientData { available: usize },

    #[error("No news found")]
    NoNews,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Internal(String),
}

impl PulseError {
    /// Whether this error already carries an HTTP-facing classification.
    pub fn is_classified(&self) -> bool {
        matches!(self, PulseError::NotFound(_) | PulseError::Internal(_))
    }
}
