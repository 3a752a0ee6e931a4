use async_trait::async_trait;
use pulse_core::{NewsArticle, NewsProvider, NewsQuery, NewsSearchResult, PulseError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::NewsError;

const BASE_URL: &str = "https://newsapi.org";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    articles: Vec<ApiArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

impl From<ApiArticle> for NewsArticle {
    fn from(a: ApiArticle) -> Self {
        NewsArticle {
            title: a.title.unwrap_or_default(),
            description: a.description,
            url: a.url.unwrap_or_default(),
            published_at: a.published_at.unwrap_or_default(),
        }
    }
}

/// Client for the NewsAPI `/v2/everything` search endpoint.
#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("market-pulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Search articles matching `query`
    pub async fn everything(&self, query: &NewsQuery) -> Result<NewsSearchResult, NewsError> {
        let url = format!("{}/v2/everything", self.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.query.clone()),
            ("pageSize", query.page_size.to_string()),
            ("apiKey", self.api_key.clone()),
        ];
        if let Some(sort_by) = &query.sort_by {
            params.push(("sortBy", sort_by.clone()));
        }
        if let Some(language) = &query.language {
            params.push(("language", language.clone()));
        }

        tracing::debug!("NewsAPI search: q={:?} pageSize={}", query.query, query.page_size);

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // NewsAPI reports failures as `{"status": "error", "code", "message"}`,
        // usually alongside a 4xx status.
        let parsed: EverythingResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) => {
                return Err(NewsError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        };

        if parsed.status != "ok" || !status.is_success() {
            return Err(NewsError::Api {
                code: parsed.code.unwrap_or_else(|| status.as_u16().to_string()),
                message: parsed.message.unwrap_or_else(|| "unexpected response".to_string()),
            });
        }

        Ok(NewsSearchResult {
            total_results: parsed.total_results,
            articles: parsed.articles.into_iter().map(NewsArticle::from).collect(),
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn search(&self, query: &NewsQuery) -> Result<NewsSearchResult, PulseError> {
        Ok(self.everything(query).await?)
    }
}
