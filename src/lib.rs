//! AI Gateway - rate-limited, cached access to a generative model
//!
//! Every model call goes through [`ContentGenerator::generate_content`]:
//! cache lookup, a FIFO queue with a minimum gap between upstream calls,
//! bounded exponential-backoff retries, and JSON extraction from the reply.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod parse;
pub mod prompts;
pub mod queue;
pub mod retry;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{AiError, Result};
pub use generator::{cache_key_for, ContentGenerator, Generated, Source};
pub use tasks::spawn_cleanup_task;
