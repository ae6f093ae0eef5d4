//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, compare_handler, health_handler, rate_limit_handler,
    recommendations_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /api/compare` - AI comparison of two cars
/// - `POST /api/recommendations` - AI recommendations for a preference set
/// - `GET /api/debug/rate-limit` - Queue snapshot
/// - `GET /api/cache/stats` - Cache statistics
/// - `DELETE /api/cache` - Clear the response cache
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/compare", post(compare_handler))
        .route("/api/recommendations", post(recommendations_handler))
        .route("/api/debug/rate-limit", get(rate_limit_handler))
        .route("/api/cache/stats", get(stats_handler))
        .route("/api/cache", delete(clear_cache_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
