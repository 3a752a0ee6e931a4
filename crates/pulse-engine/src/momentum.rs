use pulse_core::{compute_momentum, MarketDataProvider, MomentumResult, PulseError};
use std::sync::Arc;

/// Calendar days of history requested; enough to cover five sessions.
pub const HISTORY_WINDOW_DAYS: u32 = 10;

pub struct MomentumCalculator {
    market: Arc<dyn MarketDataProvider>,
}

impl MomentumCalculator {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self { market }
    }

    /// Fetch recent daily closes for `symbol` and reduce them to momentum.
    pub async fn calculate(&self, symbol: &str) -> Result<MomentumResult, PulseError> {
        let bars = self
            .market
            .daily_history(symbol, HISTORY_WINDOW_DAYS)
            .await
            .map_err(|e| PulseError::Internal(format!("Error calculating momentum: {}", e)))?;

        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
        let momentum = compute_momentum(&closes)?;

        tracing::info!(
            "Momentum for {}: score {} from {} bars",
            symbol,
            momentum.score,
            bars.len()
        );
        Ok(momentum)
    }
}
