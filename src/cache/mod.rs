//! Cache Module
//!
//! In-memory response cache with TTL expiration and FIFO eviction.

mod entry;
mod fifo;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use fifo::InsertionOrder;
pub use stats::{CacheStats, Lookup};
pub use store::ResponseCache;
