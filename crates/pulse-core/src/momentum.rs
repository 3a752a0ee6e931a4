//! Short-horizon price momentum.
//!
//! Momentum here is deliberately simple: the percentage change between each
//! pair of consecutive closes over the last five sessions, and the mean of
//! those four changes as a single score.

use crate::{MomentumResult, PulseError};

/// Number of closes the momentum window spans.
pub const MOMENTUM_WINDOW: usize = 5;

/// Round to two decimal places, ties to even on the exact binary value.
///
/// `(v * 100.0).round()` would push `0.125` up to `0.13`; the formatter
/// rounds the exact value and gives `0.12`.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Consecutive percentage changes, each rounded to two decimals.
pub fn percent_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| round2((w[1] - w[0]) / w[0] * 100.0))
        .collect()
}

/// Build a [`MomentumResult`] from closes ordered oldest to newest.
///
/// Only the last [`MOMENTUM_WINDOW`] closes are used. Fewer than that is
/// [`PulseError::InsufficientData`].
pub fn compute_momentum(closes: &[f64]) -> Result<MomentumResult, PulseError> {
    if closes.len() < MOMENTUM_WINDOW {
        return Err(PulseError::InsufficientData {
            available: closes.len(),
        });
    }

    let window = &closes[closes.len() - MOMENTUM_WINDOW..];
    let returns = percent_returns(window);
    let score = round2(mean(&returns));

    Ok(MomentumResult { returns, score })
}
