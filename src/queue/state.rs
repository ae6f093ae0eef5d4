//! Rate Limit State Module
//!
//! Shared bookkeeping between the queue handle and its drain task.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

// == Rate Limit State ==
/// Pacing state owned by one queue.
#[derive(Debug, Default)]
pub struct RateLimitState {
    /// When the last executed request finished, if any has run yet
    last_request: Mutex<Option<Instant>>,
    /// Requests submitted but not yet dequeued
    pending: AtomicUsize,
    /// True while the drain task is waiting out a gap or running a request
    processing: AtomicBool,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn enqueued(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    pub fn dequeued(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn set_processing(&self, processing: bool) {
        self.processing.store(processing, Ordering::SeqCst);
    }

    fn last_request(&self) -> Option<Instant> {
        *self.last_request.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // == Mark Request ==
    /// Records that a request consumed a rate-limit slot at `at`.
    pub fn mark_request(&self, at: Instant) {
        *self.last_request.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(at);
    }

    // == Remaining Gap ==
    /// How long the next request must still wait to honour `min_gap`.
    ///
    /// `None` when the gap has already passed or nothing has run yet.
    pub fn remaining_gap(&self, min_gap: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request()?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < min_gap).then(|| min_gap - elapsed)
    }

    // == Snapshot ==
    /// Read-only diagnostic view of the state.
    pub fn snapshot(&self, min_gap: Duration) -> RateLimitSnapshot {
        RateLimitSnapshot {
            min_gap,
            queue_length: self.pending(),
            is_processing: self.is_processing(),
            time_since_last_request: self
                .last_request()
                .map(|last| Instant::now().saturating_duration_since(last)),
        }
    }
}

// == Rate Limit Snapshot ==
/// Point-in-time view of a queue, for debugging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Configured minimum gap between upstream calls
    pub min_gap: Duration,
    /// Requests waiting to be dequeued
    pub queue_length: usize,
    /// Whether the drain task is busy
    pub is_processing: bool,
    /// Time since the last request finished, `None` before the first one
    pub time_since_last_request: Option<Duration>,
}
