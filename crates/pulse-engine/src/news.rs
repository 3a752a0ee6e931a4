use pulse_core::{MarketDataProvider, NewsItem, NewsProvider, NewsQuery, PulseError};
use std::sync::Arc;

/// Most headlines requested from (and kept from) the news provider.
pub const MAX_HEADLINES: usize = 5;

pub struct NewsFetcher {
    market: Arc<dyn MarketDataProvider>,
    news: Arc<dyn NewsProvider>,
}

impl NewsFetcher {
    pub fn new(market: Arc<dyn MarketDataProvider>, news: Arc<dyn NewsProvider>) -> Self {
        Self { market, news }
    }

    /// Latest English headlines mentioning the company or its ticker.
    ///
    /// An empty result page is an error ([`PulseError::NoNews`]) so callers can
    /// tell "nothing found" apart from a successful fetch.
    pub async fn fetch(&self, symbol: &str) -> Result<Vec<NewsItem>, PulseError> {
        let info = self.market.symbol_info(symbol).await?;
        let company_name = info.display_name(symbol);

        let query = NewsQuery::new(format!("{} OR {}", company_name, symbol), MAX_HEADLINES as u32)
            .sort_by("publishedAt")
            .language("en");

        let result = self.news.search(&query).await?;
        if result.total_results == 0 || result.articles.is_empty() {
            return Err(PulseError::NoNews);
        }

        let items: Vec<NewsItem> = result
            .articles
            .into_iter()
            .take(MAX_HEADLINES)
            .map(NewsItem::from)
            .collect();

        tracing::info!("Fetched {} headlines for {}", items.len(), symbol);
        Ok(items)
    }
}
