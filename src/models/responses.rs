//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cache::CacheStats;
use crate::generator::Generated;
use crate::queue::RateLimitSnapshot;

/// Model output returned to the caller, tagged with where it came from.
///
/// The model's fields are flattened into the top-level object, next to
/// `source` (`ai`, `cache` or `fallback`).
#[derive(Debug, Clone, Serialize)]
pub struct AiResponse {
    #[serde(flatten)]
    pub data: Map<String, Value>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl AiResponse {
    /// Wraps a generated result. Non-object output lands under `result`.
    pub fn from_generated(generated: Generated) -> Self {
        let data = match generated.data {
            Value::Object(mut map) => {
                // The gateway owns these two fields
                map.remove("source");
                map.remove("warning");
                map
            }
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };

        Self {
            data,
            source: generated.source.to_string(),
            warning: None,
        }
    }

    /// Degraded response used when the model could not be reached.
    pub fn fallback(warning: impl Into<String>) -> Self {
        Self {
            data: Map::new(),
            source: "fallback".to_string(),
            warning: Some(warning.into()),
        }
    }
}

/// Response body for GET /api/debug/rate-limit
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitResponse {
    pub min_gap_ms: u64,
    pub queue_length: usize,
    pub is_processing: bool,
    /// Milliseconds since the last upstream call finished, null before the first
    pub time_since_last_request_ms: Option<u64>,
}

impl From<RateLimitSnapshot> for RateLimitResponse {
    fn from(snapshot: RateLimitSnapshot) -> Self {
        Self {
            min_gap_ms: snapshot.min_gap.as_millis() as u64,
            queue_length: snapshot.queue_length,
            is_processing: snapshot.is_processing,
            time_since_last_request_ms: snapshot
                .time_since_last_request
                .map(|d| d.as_millis() as u64),
        }
    }
}

/// Response body for GET /api/cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for DELETE /api/cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
