//! Model Client Module
//!
//! The upstream generative model seen as one opaque operation:
//! prompt in, text out, may fail.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::Result;

// == Content Model ==
/// An upstream text-generation endpoint.
///
/// Implementations must report throttling as
/// [`AiError::RateLimited`](crate::error::AiError::RateLimited) so the retry
/// policy can fail fast on it; every other failure is treated as transient.
#[async_trait]
pub trait ContentModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
