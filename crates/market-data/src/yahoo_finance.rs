use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use pulse_core::{MarketDataProvider, PriceBar, PulseError, SymbolInfo};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

use crate::MarketDataError;

const BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at another host (used by tests against a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Chart endpoint for `symbol`, with the symbol encoded as a single path
    /// segment so `/`, `?` and `#` cannot reshape the request.
    fn chart_url(&self, symbol: &str) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| MarketDataError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| MarketDataError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    /// Fetch the chart document for a symbol over `[period1, period2]`.
    async fn fetch_chart(
        &self,
        symbol: &str,
        period1: i64,
        period2: i64,
    ) -> Result<Value, MarketDataError> {
        let url = self.chart_url(symbol)?;
        tracing::debug!("Yahoo chart request: {} ({}..{})", url, period1, period2);

        let response = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(MarketDataError::NoData(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let json: Value = response.json().await?;

        json.get("chart")
            .and_then(|v| v.get("result"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .cloned()
            .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))
    }

    /// Get identity and price fields for a symbol
    pub async fn get_symbol_info(&self, symbol: &str) -> Result<SymbolInfo, MarketDataError> {
        let now = Utc::now();
        let chart = self
            .fetch_chart(symbol, (now - ChronoDuration::days(5)).timestamp(), now.timestamp())
            .await?;

        let meta = chart
            .get("meta")
            .ok_or_else(|| MarketDataError::InvalidResponse("chart has no meta block".to_string()))?;

        let text = |key: &str| {
            meta.get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        // Latest traded close stands in for the current price.
        let last_close = closes_of(&chart)
            .and_then(|closes| closes.iter().rev().find_map(|c| c.as_f64()));

        Ok(SymbolInfo {
            symbol: text("symbol"),
            short_name: text("shortName"),
            long_name: text("longName"),
            current_price: last_close,
            regular_market_price: meta.get("regularMarketPrice").and_then(|v| v.as_f64()),
        })
    }

    /// Get daily bars covering the trailing `days` calendar days
    pub async fn get_daily_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let now = Utc::now();
        let from = now - ChronoDuration::days(i64::from(days));
        let chart = self.fetch_chart(symbol, from.timestamp(), now.timestamp()).await?;

        let timestamps = chart
            .get("timestamp")
            .and_then(|v| v.as_array())
            .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))?;

        let quote = chart
            .get("indicators")
            .and_then(|v| v.get("quote"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| MarketDataError::InvalidResponse("No quote data found".to_string()))?;

        let series = |key: &str| quote.get(key).and_then(|v| v.as_array());
        let closes = series("close")
            .ok_or_else(|| MarketDataError::InvalidResponse("No close prices".to_string()))?;
        let opens = series("open");
        let highs = series("high");
        let lows = series("low");
        let volumes = series("volume");

        let at = |values: Option<&Vec<Value>>, i: usize| {
            values.and_then(|v| v.get(i)).and_then(|v| v.as_f64())
        };

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            // Sessions without a close (halts, partial rows) are skipped.
            let (Some(ts), Some(close)) = (ts.as_i64(), closes.get(i).and_then(|v| v.as_f64()))
            else {
                continue;
            };

            let timestamp: DateTime<Utc> = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| MarketDataError::InvalidResponse("Invalid timestamp".to_string()))?;

            bars.push(PriceBar {
                timestamp,
                open: at(opens, i).unwrap_or(close),
                high: at(highs, i).unwrap_or(close),
                low: at(lows, i).unwrap_or(close),
                close,
                volume: volumes
                    .and_then(|v| v.get(i))
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0),
            });
        }

        tracing::debug!("Yahoo returned {} daily bars for {}", bars.len(), symbol);
        Ok(bars)
    }
}

fn closes_of(chart: &Value) -> Option<&Vec<Value>> {
    chart
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|q| q.get("close"))
        .and_then(|v| v.as_array())
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, PulseError> {
        Ok(self.get_symbol_info(symbol).await?)
    }

    async fn daily_history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>, PulseError> {
        Ok(self.get_daily_history(symbol, days).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    #[test]
    fn test_chart_url_encodes_symbol() {
        let client = YahooFinanceClient::default().with_base_url("http://localhost:9000/");

        let url = client.chart_url("MSFT").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/v8/finance/chart/MSFT");

        let url = client.chart_url("A/B?x#y").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/v8/finance/chart/A%2FB%3Fx%23y");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_chart_url_rejects_bad_base() {
        let client = YahooFinanceClient::default().with_base_url("not a url");
        assert!(matches!(
            client.chart_url("MSFT"),
            Err(MarketDataError::InvalidUrl(_))
        ));
    }

    fn chart_body() -> Value {
        json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "MSFT",
                        "shortName": "Microsoft Corporation",
                        "longName": "Microsoft Corporation",
                        "regularMarketPrice": 104.5
                    },
                    "timestamp": [1714521600, 1714608000, 1714694400, 1714953600, 1715040000, 1715126400],
                    "indicators": {
                        "quote": [{
                            "open":   [99.0, 100.0, 102.0, 101.0, 103.0, null],
                            "high":   [101.0, 103.0, 103.0, 104.0, 105.0, null],
                            "low":    [98.0, 99.5, 100.5, 100.0, 102.5, null],
                            "close":  [100.0, 102.0, 101.0, 103.0, 104.0, null],
                            "volume": [1000, 1100, 900, 1200, 1300, null]
                        }]
                    }
                }],
                "error": null
            }
        })
    }

    fn client_for(server: &MockServer) -> YahooFinanceClient {
        YahooFinanceClient::new(Duration::from_secs(5)).with_base_url(server.base_url())
    }

    #[tokio::test]
    async fn test_daily_history_skips_rows_without_close() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v8/finance/chart/MSFT")
                    .query_param("interval", "1d");
                then.status(200).json_body(chart_body());
            })
            .await;

        let bars = client_for(&server).get_daily_history("MSFT", 10).await.unwrap();

        mock.assert_async().await;
        assert_eq!(bars.len(), 5);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![100.0, 102.0, 101.0, 103.0, 104.0]);
        assert_eq!(bars[0].volume, 1000);
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[tokio::test]
    async fn test_symbol_info_reads_meta() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v8/finance/chart/MSFT");
                then.status(200).json_body(chart_body());
            })
            .await;

        let info = client_for(&server).get_symbol_info("MSFT").await.unwrap();

        assert!(info.is_recognized());
        assert_eq!(info.long_name.as_deref(), Some("Microsoft Corporation"));
        assert_eq!(info.current_price, Some(104.0));
        assert_eq!(info.regular_market_price, Some(104.5));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_no_data() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v8/finance/chart/ZZZZ");
                then.status(404).json_body(json!({
                    "chart": {
                        "result": null,
                        "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
                    }
                }));
            })
            .await;

        let err = client_for(&server).get_symbol_info("ZZZZ").await.unwrap_err();
        assert!(matches!(err, MarketDataError::NoData(ref s) if s == "ZZZZ"));

        let pulse_err: PulseError = err.into();
        assert!(matches!(pulse_err, PulseError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_reported_with_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v8/finance/chart/MSFT");
                then.status(503).body("unavailable");
            })
            .await;

        let err = client_for(&server).get_daily_history("MSFT", 10).await.unwrap_err();
        assert!(matches!(err, MarketDataError::Status { status: 503, .. }));
    }
}
