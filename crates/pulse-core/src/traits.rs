use async_trait::async_trait;
use crate::{NewsQuery, NewsSearchResult, PriceBar, PulseError, SymbolInfo};

/// Quote and price-history lookups keyed by ticker
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, PulseError>;

    /// Daily bars covering the trailing `days` calendar days, oldest first.
    async fn daily_history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>, PulseError>;
}

/// Free-text news search
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search(&self, query: &NewsQuery) -> Result<NewsSearchResult, PulseError>;
}

/// Prompt-in, text-out generative model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, PulseError>;

    /// Cheapest possible round trip, used by the health check.
    async fn ping(&self) -> Result<(), PulseError> {
        self.generate("test").await.map(|_| ())
    }

    fn provider_name(&self) -> &'static str;
}
