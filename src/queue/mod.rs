//! Queue Module
//!
//! Rate-limited request queue in front of the upstream model.

mod rate_limited;
mod state;

pub use rate_limited::RateLimitedQueue;
pub use state::{RateLimitSnapshot, RateLimitState};
