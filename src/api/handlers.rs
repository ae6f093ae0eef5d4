//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::client::{ContentModel, GeminiClient};
use crate::config::Config;
use crate::error::{AiError, Result};
use crate::generator::{cache_key_for, ContentGenerator, Generated};
use crate::models::{
    AiResponse, ClearResponse, CompareRequest, HealthResponse, RateLimitResponse,
    RecommendationRequest, StatsResponse,
};
use crate::prompts::{comparison_prompt, compact_summary, recommendation_prompt};

/// Comparisons change rarely
pub const COMPARISON_CACHE_TTL: Duration = Duration::from_secs(10 * 60);
pub const RECOMMENDATION_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Header telling the caller whether the body came from the model, the cache
/// or the fallback path.
pub const RESPONSE_SOURCE_HEADER: &str = "x-response-source";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ContentGenerator>,
}

impl AppState {
    /// Creates a new AppState around the given generator.
    pub fn new(generator: ContentGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Creates a new AppState backed by the Gemini client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model: Arc<dyn ContentModel> = Arc::new(GeminiClient::from_config(config)?);
        Ok(Self::new(ContentGenerator::from_config(model, config)))
    }
}

/// Builds the response for a generation outcome.
///
/// Any error degrades to a `fallback` response so the caller can compute a
/// non-AI result itself.
fn respond(outcome: Result<Generated>, what: &str) -> Response {
    let body = match outcome {
        Ok(generated) => AiResponse::from_generated(generated),
        Err(err) => {
            warn!("AI {} failed, using fallback: {}", what, err);
            AiResponse::fallback(format!("AI {} unavailable: {}", what, err))
        }
    };

    let source = HeaderValue::from_str(&body.source)
        .unwrap_or_else(|_| HeaderValue::from_static("fallback"));

    (
        [(HeaderName::from_static(RESPONSE_SOURCE_HEADER), source)],
        Json(body),
    )
        .into_response()
}

/// Handler for POST /api/compare
pub async fn compare_handler(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Response> {
    let (car1, car2) = req.validate().map_err(AiError::InvalidRequest)?;

    let cache_key = cache_key_for(&json!({ "car1": car1.id, "car2": car2.id }))?;
    let prompt = comparison_prompt(&car1, &car2);

    let outcome = state
        .generator
        .generate_content(&prompt, Some(&cache_key), Some(COMPARISON_CACHE_TTL))
        .await;

    Ok(respond(outcome, "comparison"))
}

/// Handler for POST /api/recommendations
pub async fn recommendations_handler(
    State(state): State<AppState>,
    Json(req): Json<RecommendationRequest>,
) -> Result<Response> {
    if let Some(error_msg) = req.validate() {
        return Err(AiError::InvalidRequest(error_msg));
    }

    let car_ids: Vec<&str> = req.cars.iter().map(|car| car.id.as_str()).collect();
    let cache_key = cache_key_for(&json!({
        "preferences": req.preferences,
        "summary": req.summary,
        "cars": car_ids,
    }))?;
    let summary = req
        .summary
        .clone()
        .unwrap_or_else(|| compact_summary(&req.preferences));
    let prompt = recommendation_prompt(&summary, &req.cars);

    let outcome = state
        .generator
        .generate_content(&prompt, Some(&cache_key), Some(RECOMMENDATION_CACHE_TTL))
        .await;

    Ok(respond(outcome, "recommendations"))
}

/// Handler for GET /api/debug/rate-limit
pub async fn rate_limit_handler(State(state): State<AppState>) -> Json<RateLimitResponse> {
    Json(state.generator.rate_limit_state().into())
}

/// Handler for GET /api/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.generator.cache_stats().await.into())
}

/// Handler for DELETE /api/cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.generator.clear_cache().await;
    Json(ClearResponse::new())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
