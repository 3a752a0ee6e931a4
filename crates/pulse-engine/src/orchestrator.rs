use chrono::Local;
use pulse_core::{
    LanguageModel, MarketDataProvider, MarketPulseResponse, NewsProvider, PulseError,
};
use std::sync::Arc;

use crate::{MomentumCalculator, NewsFetcher, PulseClassifier};

/// Runs `validate -> momentum -> news -> classify -> assemble` for one ticker.
///
/// Momentum is required; news and classification degrade to empty/neutral
/// values instead of failing the request.
pub struct MarketPulseOrchestrator {
    market: Arc<dyn MarketDataProvider>,
    momentum: MomentumCalculator,
    news: NewsFetcher,
    classifier: PulseClassifier,
}

impl MarketPulseOrchestrator {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            momentum: MomentumCalculator::new(market.clone()),
            news: NewsFetcher::new(market.clone(), news),
            classifier: PulseClassifier::new(market.clone(), model),
            market,
        }
    }

    /// Normalize a raw ticker and confirm the market-data provider knows it.
    pub async fn validate(&self, raw_ticker: &str) -> Result<String, PulseError> {
        let ticker = raw_ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(PulseError::NotFound(ticker));
        }

        match self.market.symbol_info(&ticker).await {
            Ok(info) if info.is_recognized() => Ok(ticker),
            Ok(_) => Err(PulseError::NotFound(ticker)),
            Err(e) => {
                tracing::debug!("Lookup for {} failed: {}", ticker, e);
                Err(PulseError::NotFound(ticker))
            }
        }
    }

    /// Build the full market pulse for `raw_ticker`.
    ///
    /// Errors are either [`PulseError::NotFound`] or [`PulseError::Internal`];
    /// anything else is wrapped as an internal server error.
    pub async fn market_pulse(&self, raw_ticker: &str) -> Result<MarketPulseResponse, PulseError> {
        match self.run(raw_ticker).await {
            Ok(response) => Ok(response),
            Err(e) if e.is_classified() => Err(e),
            Err(e) => Err(PulseError::Internal(format!("Internal server error: {}", e))),
        }
    }

    async fn run(&self, raw_ticker: &str) -> Result<MarketPulseResponse, PulseError> {
        let ticker = self.validate(raw_ticker).await?;
        tracing::info!("Building market pulse for {}", ticker);

        let momentum = self
            .momentum
            .calculate(&ticker)
            .await
            .map_err(|e| PulseError::Internal(format!("Momentum calculation error: {}", e)))?;

        let news = match self.news.fetch(&ticker).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("News unavailable for {}, continuing without: {}", ticker, e);
                Vec::new()
            }
        };

        let pulse = self.classifier.classify(&ticker, &momentum, &news).await;

        Ok(MarketPulseResponse {
            ticker,
            as_of: Local::now().date_naive(),
            momentum,
            news,
            pulse: pulse.label,
            llm_explanation: pulse.explanation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_articles, FakeMarketData, FakeModel, FakeNews};
    use pulse_core::PulseLabel;

    const BULLISH_REPLY: &str = "PULSE: bullish\nEXPLANATION: Strong upward momentum.";

    fn orchestrator(
        market: FakeMarketData,
        news: FakeNews,
        model: FakeModel,
    ) -> MarketPulseOrchestrator {
        MarketPulseOrchestrator::new(Arc::new(market), Arc::new(news), Arc::new(model))
    }

    fn healthy_market() -> FakeMarketData {
        FakeMarketData::with_closes("MSFT", "Microsoft Corporation", vec![100.0, 102.0, 101.0, 103.0, 104.0])
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let orchestrator = orchestrator(
            healthy_market(),
            FakeNews::with_articles(sample_articles(3)),
            FakeModel::replying(BULLISH_REPLY),
        );

        let response = orchestrator.market_pulse("msft").await.unwrap();

        assert_eq!(response.ticker, "MSFT");
        assert_eq!(response.as_of, Local::now().date_naive());
        assert_eq!(response.momentum.returns, vec![2.0, -0.98, 1.98, 0.97]);
        assert_eq!(response.momentum.score, 0.99);
        assert_eq!(response.news.len(), 3);
        assert_eq!(response.pulse, PulseLabel::Bullish);
        assert_eq!(response.llm_explanation, "Strong upward momentum.");
    }

    #[tokio::test]
    async fn test_unrecognized_ticker_is_not_found() {
        let orchestrator = orchestrator(
            FakeMarketData::unrecognized(),
            FakeNews::with_articles(Vec::new()),
            FakeModel::replying(BULLISH_REPLY),
        );

        let err = orchestrator.market_pulse(" zzzz ").await.unwrap_err();
        assert!(matches!(err, PulseError::NotFound(ref t) if t == "ZZZZ"));
        assert_eq!(err.to_string(), "Ticker 'ZZZZ' not found");
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_found() {
        let orchestrator = orchestrator(
            FakeMarketData::unreachable(),
            FakeNews::with_articles(Vec::new()),
            FakeModel::replying(BULLISH_REPLY),
        );

        let err = orchestrator.market_pulse("AAPL").await.unwrap_err();
        assert!(matches!(err, PulseError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_ticker_is_not_found() {
        let orchestrator = orchestrator(
            healthy_market(),
            FakeNews::with_articles(Vec::new()),
            FakeModel::replying(BULLISH_REPLY),
        );

        assert!(matches!(
            orchestrator.market_pulse("   ").await,
            Err(PulseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_momentum_failure_is_internal() {
        let orchestrator = orchestrator(
            FakeMarketData::with_closes("IPO", "Fresh Listing", vec![10.0, 10.5]),
            FakeNews::with_articles(sample_articles(1)),
            FakeModel::replying(BULLISH_REPLY),
        );

        let err = orchestrator.market_pulse("IPO").await.unwrap_err();
        match err {
            PulseError::Internal(msg) => {
                assert_eq!(
                    msg,
                    "Momentum calculation error: Insufficient data for momentum calculation"
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_news_failure_is_not_fatal() {
        let orchestrator = orchestrator(
            healthy_market(),
            FakeNews::unreachable(),
            FakeModel::replying(BULLISH_REPLY),
        );

        let response = orchestrator.market_pulse("MSFT").await.unwrap();
        assert!(response.news.is_empty());
        assert_eq!(response.pulse, PulseLabel::Bullish);
    }

    #[tokio::test]
    async fn test_zero_news_results_is_not_fatal() {
        let orchestrator = orchestrator(
            healthy_market(),
            FakeNews::with_articles(Vec::new()),
            FakeModel::replying(BULLISH_REPLY),
        );

        let response = orchestrator.market_pulse("MSFT").await.unwrap();
        assert!(response.news.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_degrades_to_neutral() {
        let orchestrator = orchestrator(
            healthy_market(),
            FakeNews::with_articles(sample_articles(2)),
            FakeModel::unreachable(),
        );

        let response = orchestrator.market_pulse("MSFT").await.unwrap();
        assert_eq!(response.pulse, PulseLabel::Neutral);
        assert!(response.llm_explanation.starts_with("Error in AI analysis:"));
        assert_eq!(response.news.len(), 2);
    }
}
