use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Placeholder used when the news provider has no description for an article.
pub const NO_DESCRIPTION: &str = "No description available";

/// Explanation used when the model output carries no usable `EXPLANATION:` line.
pub const DEFAULT_EXPLANATION: &str = "Unable to generate explanation";

/// Daily OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Identity and price fields returned by a market-data lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub current_price: Option<f64>,
    pub regular_market_price: Option<f64>,
}

impl SymbolInfo {
    /// A lookup only counts as a hit when it names the instrument somehow.
    pub fn is_recognized(&self) -> bool {
        self.symbol.is_some() || self.short_name.is_some()
    }

    /// Company name for prompts and news queries, falling back to the ticker.
    pub fn display_name<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.long_name.as_deref().unwrap_or(ticker)
    }

    pub fn price(&self) -> Option<f64> {
        self.current_price.or(self.regular_market_price)
    }
}

/// Last four daily returns (percent) and their mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumResult {
    pub returns: Vec<f64>,
    pub score: f64,
}

/// Article as handed back by a news provider, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub published_at: String,
}

/// Normalized headline returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub url: String,
    pub published: String,
}

impl From<NewsArticle> for NewsItem {
    fn from(article: NewsArticle) -> Self {
        let description = article
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        let published = article.published_at.chars().take(10).collect();

        Self {
            title: article.title,
            description,
            url: article.url,
            published,
        }
    }
}

/// Search parameters understood by a news provider.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsQuery {
    pub query: String,
    pub page_size: u32,
    pub language: Option<String>,
    pub sort_by: Option<String>,
}

impl NewsQuery {
    pub fn new(query: impl Into<String>, page_size: u32) -> Self {
        Self {
            query: query.into(),
            page_size,
            language: None,
            sort_by: None,
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }
}

/// One page of news search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsSearchResult {
    pub total_results: u64,
    pub articles: Vec<NewsArticle>,
}

/// Three-valued market sentiment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseLabel {
    Bullish,
    #[default]
    Neutral,
    Bearish,
}

impl PulseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PulseLabel::Bullish => "bullish",
            PulseLabel::Neutral => "neutral",
            PulseLabel::Bearish => "bearish",
        }
    }
}

impl fmt::Display for PulseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PulseLabel {
    type Err = String;

    /// Exact match only; callers trim and lowercase first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bullish" => Ok(PulseLabel::Bullish),
            "neutral" => Ok(PulseLabel::Neutral),
            "bearish" => Ok(PulseLabel::Bearish),
            other => Err(format!("unknown pulse label: {}", other)),
        }
    }
}

/// Classification handed back to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseResult {
    pub label: PulseLabel,
    pub explanation: String,
}

impl PulseResult {
    pub fn failed(cause: impl fmt::Display) -> Self {
        Self {
            label: PulseLabel::Neutral,
            explanation: format!("Error in AI analysis: {}", cause),
        }
    }
}

impl Default for PulseResult {
    fn default() -> Self {
        Self {
            label: PulseLabel::Neutral,
            explanation: DEFAULT_EXPLANATION.to_string(),
        }
    }
}

/// Outcome of reading a model response in the `PULSE:` / `EXPLANATION:` format.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPulse {
    /// At least one of the two lines was usable.
    Parsed {
        label: Option<PulseLabel>,
        explanation: Option<String>,
    },
    Unparsed,
}

impl ParsedPulse {
    /// Collapse into a result, filling whatever is missing with defaults.
    pub fn into_result(self) -> PulseResult {
        let defaults = PulseResult::default();
        match self {
            ParsedPulse::Parsed { label, explanation } => PulseResult {
                label: label.unwrap_or(defaults.label),
                explanation: explanation.unwrap_or(defaults.explanation),
            },
            ParsedPulse::Unparsed => defaults,
        }
    }
}

/// Unified response for `/api/v1/market-pulse`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPulseResponse {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub momentum: MomentumResult,
    pub news: Vec<NewsItem>,
    pub pulse: PulseLabel,
    pub llm_explanation: String,
}

/// Status string recorded for a dependency that answered its probe.
pub const CONNECTED: &str = "connected";

/// Per-dependency reachability snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub services: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_label_serializes_lowercase() {
        let json = serde_json::to_string(&PulseLabel::Bearish).unwrap();
        assert_eq!(json, "\"bearish\"");
        assert_eq!(PulseLabel::default(), PulseLabel::Neutral);
    }

    #[test]
    fn test_pulse_label_from_str_is_exact() {
        assert_eq!("bullish".parse::<PulseLabel>(), Ok(PulseLabel::Bullish));
        assert!("Bullish".parse::<PulseLabel>().is_err());
        assert!("maybe".parse::<PulseLabel>().is_err());
    }

    #[test]
    fn test_news_item_from_article_fills_placeholder_and_truncates_date() {
        let article = NewsArticle {
            title: "Apple beats estimates".to_string(),
            description: None,
            url: "https://example.com/a".to_string(),
            published_at: "2024-05-02T21:15:00Z".to_string(),
        };
        let item = NewsItem::from(article);
        assert_eq!(item.description, NO_DESCRIPTION);
        assert_eq!(item.published, "2024-05-02");

        let empty = NewsArticle {
            title: "t".to_string(),
            description: Some(String::new()),
            url: "u".to_string(),
            published_at: "2024-05".to_string(),
        };
        let item = NewsItem::from(empty);
        assert_eq!(item.description, NO_DESCRIPTION);
        assert_eq!(item.published, "2024-05");
    }

    #[test]
    fn test_symbol_info_fallbacks() {
        let info = SymbolInfo {
            symbol: Some("MSFT".to_string()),
            regular_market_price: Some(410.5),
            ..Default::default()
        };
        assert!(info.is_recognized());
        assert_eq!(info.display_name("MSFT"), "MSFT");
        assert_eq!(info.price(), Some(410.5));

        assert!(!SymbolInfo::default().is_recognized());
    }

    #[test]
    fn test_parsed_pulse_fills_missing_fields() {
        let partial = ParsedPulse::Parsed {
            label: None,
            explanation: Some("Flat tape.".to_string()),
        };
        let result = partial.into_result();
        assert_eq!(result.label, PulseLabel::Neutral);
        assert_eq!(result.explanation, "Flat tape.");

        assert_eq!(ParsedPulse::Unparsed.into_result(), PulseResult::default());
    }

    #[test]
    fn test_market_pulse_response_shape() {
        let response = MarketPulseResponse {
            ticker: "NVDA".to_string(),
            as_of: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            momentum: MomentumResult {
                returns: vec![1.0, -0.5, 0.25, 2.0],
                score: 0.69,
            },
            news: Vec::new(),
            pulse: PulseLabel::Bullish,
            llm_explanation: "Momentum is strong.".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["as_of"], "2024-05-03");
        assert_eq!(value["pulse"], "bullish");
        assert_eq!(value["momentum"]["score"], 0.69);
        assert!(value["news"].as_array().unwrap().is_empty());
    }
}
