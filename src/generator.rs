//! Content Generator Module
//!
//! Single entry point for model calls: cache lookup, rate-limited queue,
//! retry-wrapped upstream call, response parsing and cache store.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheStats, ResponseCache};
use crate::client::ContentModel;
use crate::config::Config;
use crate::error::{AiError, Result};
use crate::parse::parse_response;
use crate::queue::{RateLimitSnapshot, RateLimitedQueue};
use crate::retry::{with_retry, RetryConfig};

// == Source ==
/// Where a generated result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ai,
    Cache,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Ai => "ai",
            Source::Cache => "cache",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Generated ==
/// Parsed model output tagged with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T = Value> {
    pub data: T,
    pub source: Source,
}

// == Cache Key ==
/// Builds a cache key from any serializable input, as its JSON encoding.
pub fn cache_key_for<K: Serialize + ?Sized>(input: &K) -> Result<String> {
    serde_json::to_string(input)
        .map_err(|e| AiError::Internal(format!("failed to build cache key: {}", e)))
}

// == Content Generator ==
/// Owns the cache and the request queue for one upstream model.
pub struct ContentGenerator {
    model: Arc<dyn ContentModel>,
    queue: RateLimitedQueue<String>,
    cache: Arc<RwLock<ResponseCache<Value>>>,
    retry: RetryConfig,
}

impl ContentGenerator {
    // == Constructor ==
    /// Creates a generator. Spawns the queue's drain task, so it must run
    /// inside a tokio runtime.
    pub fn new(
        model: Arc<dyn ContentModel>,
        cache: ResponseCache<Value>,
        min_gap: Duration,
        retry: RetryConfig,
    ) -> Self {
        Self {
            model,
            queue: RateLimitedQueue::new(min_gap),
            cache: Arc::new(RwLock::new(cache)),
            retry,
        }
    }

    /// Creates a generator with the cache, pacing and retry settings of `config`.
    pub fn from_config(model: Arc<dyn ContentModel>, config: &Config) -> Self {
        let cache = ResponseCache::new(config.cache_max_entries, config.cache_default_ttl);
        Self::new(model, cache, config.rate_limit_gap, config.retry)
    }

    // == Generate Content ==
    /// Returns the JSON object the model produced for `prompt`.
    ///
    /// With a `cache_key`, a valid cached value is returned without touching
    /// the queue, and a fresh result is cached for `cache_ttl` (or the cache
    /// default). Errors are never swallowed.
    pub async fn generate_content(
        &self,
        prompt: &str,
        cache_key: Option<&str>,
        cache_ttl: Option<Duration>,
    ) -> Result<Generated> {
        self.generate_content_as(prompt, cache_key, cache_ttl).await
    }

    /// Like [`generate_content`](Self::generate_content), decoding into `T`.
    ///
    /// A response that does not match `T` is an invalid response and is not
    /// cached.
    pub async fn generate_content_as<T: DeserializeOwned>(
        &self,
        prompt: &str,
        cache_key: Option<&str>,
        cache_ttl: Option<Duration>,
    ) -> Result<Generated<T>> {
        if let Some(key) = cache_key {
            let cached = self.cache.write().await.get(key);
            if let Some(value) = cached {
                match serde_json::from_value(value) {
                    Ok(data) => {
                        debug!(key, "Serving response from cache");
                        return Ok(Generated {
                            data,
                            source: Source::Cache,
                        });
                    }
                    Err(e) => debug!(key, error = %e, "Cached value has another shape, refetching"),
                }
            }
        }

        let text = self.call_model(prompt).await?;

        let value: Value = parse_response(&text)?;
        let data: T = serde_json::from_value(value.clone())
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        if let Some(key) = cache_key {
            self.cache.write().await.set(key, value, cache_ttl);
        }

        Ok(Generated {
            data,
            source: Source::Ai,
        })
    }

    /// One queue submission running the retry-wrapped model call.
    async fn call_model(&self, prompt: &str) -> Result<String> {
        let model = self.model.clone();
        let retry = self.retry;
        let prompt = prompt.to_string();

        self.queue
            .submit(move || async move {
                let model = &model;
                let prompt = prompt.as_str();
                with_retry(&retry, move || model.generate(prompt)).await
            })
            .await
    }

    // == Diagnostics ==
    /// Read-only view of the queue's pacing state.
    pub fn rate_limit_state(&self) -> RateLimitSnapshot {
        self.queue.snapshot()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Removes every cached response.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// Shared handle to the cache, for the background cleanup task.
    pub fn cache(&self) -> Arc<RwLock<ResponseCache<Value>>> {
        self.cache.clone()
    }
}
