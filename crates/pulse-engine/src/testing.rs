//! In-memory providers for exercising the pipeline without network access.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use pulse_core::{
    LanguageModel, MarketDataProvider, NewsArticle, NewsProvider, NewsQuery, NewsSearchResult,
    PriceBar, PulseError, SymbolInfo,
};
use std::sync::Mutex;

/// Market data backed by fixed values. `None` fields make the matching call fail.
pub struct FakeMarketData {
    pub info: Option<SymbolInfo>,
    pub closes: Option<Vec<f64>>,
}

impl FakeMarketData {
    pub fn with_closes(symbol: &str, long_name: &str, closes: Vec<f64>) -> Self {
        Self {
            info: Some(SymbolInfo {
                symbol: Some(symbol.to_string()),
                short_name: Some(long_name.to_string()),
                long_name: Some(long_name.to_string()),
                current_price: closes.last().copied(),
                regular_market_price: None,
            }),
            closes: Some(closes),
        }
    }

    /// Lookup succeeds but names nothing.
    pub fn unrecognized() -> Self {
        Self {
            info: Some(SymbolInfo::default()),
            closes: None,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            info: None,
            closes: None,
        }
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarketData {
    async fn symbol_info(&self, _symbol: &str) -> Result<SymbolInfo, PulseError> {
        self.info
            .clone()
            .ok_or_else(|| PulseError::Upstream("market data unavailable".to_string()))
    }

    async fn daily_history(&self, _symbol: &str, _days: u32) -> Result<Vec<PriceBar>, PulseError> {
        let closes = self
            .closes
            .as_ref()
            .ok_or_else(|| PulseError::Upstream("history unavailable".to_string()))?;

        let start = Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).single().unwrap_or_else(Utc::now);
        Ok(closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar {
                timestamp: start + Duration::days(i as i64),
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1_000,
            })
            .collect())
    }
}

/// News search that returns a fixed page (or fails) and records queries.
pub struct FakeNews {
    articles: Option<Vec<NewsArticle>>,
    queries: Mutex<Vec<NewsQuery>>,
}

impl FakeNews {
    pub fn with_articles(articles: Vec<NewsArticle>) -> Self {
        Self {
            articles: Some(articles),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            articles: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<NewsQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NewsProvider for FakeNews {
    async fn search(&self, query: &NewsQuery) -> Result<NewsSearchResult, PulseError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        let articles = self
            .articles
            .clone()
            .ok_or_else(|| PulseError::Upstream("news provider unavailable".to_string()))?;

        Ok(NewsSearchResult {
            total_results: articles.len() as u64,
            articles,
        })
    }
}

/// Model that answers every prompt with the same text and records prompts.
pub struct FakeModel {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn generate(&self, prompt: &str) -> Result<String, PulseError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply
            .clone()
            .ok_or_else(|| PulseError::Upstream("model unavailable".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// `count` articles, newest first, the last one without a description.
pub fn sample_articles(count: usize) -> Vec<NewsArticle> {
    (0..count)
        .map(|i| NewsArticle {
            title: format!("Headline {}", i + 1),
            description: if i + 1 == count {
                None
            } else {
                Some(format!("Summary {}", i + 1))
            },
            url: format!("https://news.example.com/{}", i + 1),
            published_at: format!("2024-05-{:02}T12:00:00Z", 20 - i),
        })
        .collect()
}
