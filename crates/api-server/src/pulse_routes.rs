use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension,
    routing::get,
    Json, Router,
};
use pulse_core::{HealthReport, MarketPulseResponse};
use serde::{Deserialize, Serialize};

use crate::request_id::RequestId;
use crate::{AppError, AppState};

pub const MARKET_PULSE_PATH: &str = "/api/v1/market-pulse";
pub const HEALTH_PATH: &str = "/health";

const API_NAME: &str = "Stock Market Pulse API";

#[derive(Debug, Deserialize)]
pub struct MarketPulseQuery {
    pub ticker: String,
}

/// Served at `/` so a client can discover the other endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    pub endpoints: ApiEndpoints,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEndpoints {
    pub market_pulse: String,
    pub health: String,
}

impl ApiInfo {
    pub fn current() -> Self {
        Self {
            message: API_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints: ApiEndpoints {
                market_pulse: format!("{}?ticker=TICKER", MARKET_PULSE_PATH),
                health: HEALTH_PATH.to_string(),
            },
        }
    }
}

pub fn pulse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api_info))
        .route(HEALTH_PATH, get(health_check))
        .route(MARKET_PULSE_PATH, get(market_pulse))
}

async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo::current())
}

async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.report().await)
}

async fn market_pulse(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<MarketPulseQuery>, QueryRejection>,
) -> Result<Json<MarketPulseResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::InvalidQuery(e.body_text()))?;

    match state.orchestrator.market_pulse(&query.ticker).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::warn!(%request_id, ticker = %query.ticker, "Market pulse failed: {}", e);
            Err(e.into())
        }
    }
}
