//! Model-backed pulse classification.
//!
//! The model is asked for exactly two lines:
//!
//! ```text
//! PULSE: <bullish|neutral|bearish>
//! EXPLANATION: <one sentence>
//! ```
//!
//! Anything else in the reply is ignored. Missing or malformed lines fall
//! back to the defaults in [`PulseResult::default`].

use pulse_core::{
    LanguageModel, MarketDataProvider, MomentumResult, NewsItem, ParsedPulse, PulseError,
    PulseLabel, PulseResult, SymbolInfo,
};
use std::sync::Arc;

use crate::news::MAX_HEADLINES;

const PULSE_PREFIX: &str = "PULSE:";
const EXPLANATION_PREFIX: &str = "EXPLANATION:";

pub struct PulseClassifier {
    market: Arc<dyn MarketDataProvider>,
    model: Arc<dyn LanguageModel>,
}

impl PulseClassifier {
    pub fn new(market: Arc<dyn MarketDataProvider>, model: Arc<dyn LanguageModel>) -> Self {
        Self { market, model }
    }

    /// Classify `symbol`. Never fails: any error becomes a neutral result whose
    /// explanation names the cause.
    pub async fn classify(
        &self,
        symbol: &str,
        momentum: &MomentumResult,
        news: &[NewsItem],
    ) -> PulseResult {
        match self.try_classify(symbol, momentum, news).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Pulse classification failed for {}: {}", symbol, e);
                PulseResult::failed(e)
            }
        }
    }

    async fn try_classify(
        &self,
        symbol: &str,
        momentum: &MomentumResult,
        news: &[NewsItem],
    ) -> Result<PulseResult, PulseError> {
        let info = self.market.symbol_info(symbol).await?;
        let prompt = build_prompt(symbol, &info, momentum, news);

        let reply = self.model.generate(&prompt).await?;
        let parsed = parse_pulse_response(&reply);
        if parsed == ParsedPulse::Unparsed {
            tracing::warn!(
                "{} reply for {} had no usable PULSE/EXPLANATION lines",
                self.model.provider_name(),
                symbol
            );
        }

        let result = parsed.into_result();
        tracing::info!("Pulse for {}: {}", symbol, result.label);
        Ok(result)
    }
}

/// Render the analysis prompt. Only headline titles are included.
pub fn build_prompt(
    symbol: &str,
    info: &SymbolInfo,
    momentum: &MomentumResult,
    news: &[NewsItem],
) -> String {
    let price = info
        .price()
        .map(|p| format!("{:?}", p))
        .unwrap_or_else(|| "N/A".to_string());

    let mut lines = vec![
        "**STOCK PULSE ANALYSIS REQUEST**".to_string(),
        format!("Company: {} ({})", info.display_name(symbol), symbol),
        format!("Current Price: ${}", price),
        String::new(),
        "**MOMENTUM DATA:**".to_string(),
        format!("- 5-Day Returns: {:?}%", momentum.returns),
        format!("- Momentum Score: {:?}%", momentum.score),
        String::new(),
        "**NEWS HEADLINES:**".to_string(),
    ];

    lines.extend(
        news.iter()
            .take(MAX_HEADLINES)
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item.title)),
    );

    lines.extend(
        [
            "",
            "**ANALYSIS REQUEST:**",
            "Based on the momentum and news data above, provide:",
            "",
            "1. **PULSE CLASSIFICATION**: Choose EXACTLY ONE word:",
            "   - bullish (strong positive signals)",
            "   - neutral (mixed signals)",
            "   - bearish (negative signals)",
            "",
            "2. **EXPLANATION**: One concise sentence explaining the pulse decision based on:",
            "   - Momentum score interpretation",
            "   - News sentiment impact",
            "",
            "Format your response as:",
            "PULSE: [bullish/neutral/bearish]",
            "EXPLANATION: [your explanation]",
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    lines.join("\n")
}

/// Read the two-line reply format. Later lines win over earlier ones, and a
/// `PULSE:` value outside the allowed set is ignored rather than coerced.
pub fn parse_pulse_response(reply: &str) -> ParsedPulse {
    let mut label = None;
    let mut explanation = None;

    for line in reply.trim().lines() {
        if let Some(rest) = line.strip_prefix(PULSE_PREFIX) {
            if let Ok(parsed) = rest.trim().to_lowercase().parse::<PulseLabel>() {
                label = Some(parsed);
            }
        } else if let Some(rest) = line.strip_prefix(EXPLANATION_PREFIX) {
            explanation = Some(rest.trim().to_string());
        }
    }

    if label.is_none() && explanation.is_none() {
        ParsedPulse::Unparsed
    } else {
        ParsedPulse::Parsed { label, explanation }
    }
}
