//! HTTP surface of the market pulse service.

pub mod config;
pub mod error;
pub mod pulse_routes;
pub mod request_id;
pub mod security_headers;

use anyhow::{Context, Result};
use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use llm_client::{GeminiClient, GroqClient};
use market_data::YahooFinanceClient;
use news_client::NewsApiClient;
use pulse_core::{LanguageModel, MarketDataProvider, NewsProvider};
use pulse_engine::{HealthReporter, MarketPulseOrchestrator};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use config::{ModelProvider, ServerConfig};
pub use error::AppError;

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<MarketPulseOrchestrator>,
    pub health: Arc<HealthReporter>,
}

impl AppState {
    pub fn new(orchestrator: MarketPulseOrchestrator, health: HealthReporter) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            health: Arc::new(health),
        }
    }
}

/// Wire the real upstream clients together from `config`.
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let timeout = config.http_timeout;

    let market: Arc<dyn MarketDataProvider> = Arc::new(YahooFinanceClient::new(timeout));
    let news: Arc<dyn NewsProvider> =
        Arc::new(NewsApiClient::new(config.news_api_key.clone(), timeout));
    let gemini: Arc<dyn LanguageModel> = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        timeout,
    ));
    let groq: Option<Arc<dyn LanguageModel>> = config.groq_api_key.clone().map(|key| {
        Arc::new(GroqClient::new(key, config.groq_model.clone(), timeout)) as Arc<dyn LanguageModel>
    });

    let pulse_model = match config.pulse_provider {
        ModelProvider::Gemini => gemini.clone(),
        ModelProvider::Groq => groq
            .clone()
            .context("LLM_PROVIDER=groq requires GROQ_API_KEY")?,
    };
    tracing::info!("Pulse classification via {}", pulse_model.provider_name());

    Ok(AppState::new(
        MarketPulseOrchestrator::new(market.clone(), news.clone(), pulse_model),
        HealthReporter::new(market, news, gemini, groq),
    ))
}

/// Routes plus the middleware stack. Only `cors_origin` may call from a
/// browser, with credentials.
pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router> {
    let origin: HeaderValue = cors_origin
        .parse()
        .with_context(|| format!("invalid CORS_ORIGIN '{}'", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
        )
    });

    Ok(pulse_routes::pulse_routes()
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(security_headers::security_headers_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(trace)
        .layer(cors))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let cause = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", cause);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": format!("Internal server error: {}", cause) })),
    )
        .into_response()
}

/// `RUST_LOG` filtering (default `info`); `LOG_FORMAT=json` switches to
/// structured output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

pub async fn run_server() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let state = build_state(&config)?;
    let app = build_router(state, &config.cors_origin)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Starting Stock Market Pulse API on http://{}", addr);
    tracing::info!("Available endpoints:");
    tracing::info!("  GET {}?ticker=MSFT", pulse_routes::MARKET_PULSE_PATH);
    tracing::info!("  GET {}", pulse_routes::HEALTH_PATH);
    tracing::info!("  GET /");
    tracing::info!("CORS origin: {}", config.cors_origin);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(extra: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = [("NEWS_API_KEY", "news"), ("GEMINI_API_KEY", "gem")]
            .iter()
            .chain(extra.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_build_state_with_gemini() {
        assert!(build_state(&config(&[])).is_ok());
    }

    #[test]
    fn test_build_state_with_groq() {
        let config = config(&[("GROQ_API_KEY", "groq"), ("LLM_PROVIDER", "groq")]);
        assert!(build_state(&config).is_ok());
    }

    #[test]
    fn test_invalid_cors_origin_is_rejected() {
        let state = build_state(&config(&[])).unwrap();
        assert!(build_router(state, "bad\norigin").is_err());
    }

    #[test]
    fn test_panic_handler_body() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
