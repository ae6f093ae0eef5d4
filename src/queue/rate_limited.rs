//! Rate-Limited Queue Module
//!
//! Serializes units of work through a single drain task that enforces a
//! minimum gap between consecutive upstream calls.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error};

use crate::error::{AiError, Result};
use crate::queue::{RateLimitSnapshot, RateLimitState};

// == Queued Request ==
/// A pending unit of work and the channel its caller is waiting on.
struct QueuedRequest<T> {
    execute: Box<dyn FnOnce() -> BoxFuture<'static, Result<T>> + Send>,
    reply: oneshot::Sender<Result<T>>,
}

// == Rate-Limited Queue ==
/// FIFO queue with fixed minimum-gap pacing.
///
/// Exactly one drain task consumes the queue, so requests run one at a time
/// in submission order. A request whose caller stopped waiting before it
/// reached the head is dropped without using a slot.
pub struct RateLimitedQueue<T> {
    sender: mpsc::UnboundedSender<QueuedRequest<T>>,
    state: Arc<RateLimitState>,
    min_gap: Duration,
}

impl<T: Send + 'static> RateLimitedQueue<T> {
    // == Constructor ==
    /// Creates the queue and spawns its drain task.
    ///
    /// Must be called from within a tokio runtime. The drain task exits once
    /// the queue is dropped and the remaining requests have run.
    pub fn new(min_gap: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let state = Arc::new(RateLimitState::new());

        tokio::spawn(drain(receiver, state.clone(), min_gap));

        Self {
            sender,
            state,
            min_gap,
        }
    }

    // == Submit ==
    /// Appends `work` to the tail of the queue and waits for its outcome.
    pub async fn submit<F, Fut>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (reply, outcome) = oneshot::channel();
        let request = QueuedRequest {
            execute: Box::new(move || work().boxed()),
            reply,
        };

        self.state.enqueued();
        if self.sender.send(request).is_err() {
            self.state.dequeued();
            return Err(AiError::QueueClosed);
        }

        outcome.await.map_err(|_| AiError::QueueClosed)?
    }

    /// Read-only view of the pacing state.
    pub fn snapshot(&self) -> RateLimitSnapshot {
        self.state.snapshot(self.min_gap)
    }
}

// == Drain Loop ==
async fn drain<T>(
    mut receiver: mpsc::UnboundedReceiver<QueuedRequest<T>>,
    state: Arc<RateLimitState>,
    min_gap: Duration,
) {
    while let Some(request) = receiver.recv().await {
        state.set_processing(true);

        if let Some(wait) = state.remaining_gap(min_gap, Instant::now()) {
            debug!("Rate limit: waiting {}ms before next request", wait.as_millis());
            tokio::time::sleep(wait).await;
        }

        state.dequeued();

        if request.reply.is_closed() {
            debug!("Skipping queued request, caller is no longer waiting");
        } else {
            let outcome = AssertUnwindSafe((request.execute)())
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    error!("Queued request panicked");
                    Err(AiError::Internal("queued request panicked".to_string()))
                });

            // Failed calls still used their slot
            state.mark_request(Instant::now());
            let _ = request.reply.send(outcome);
        }

        if state.pending() == 0 {
            state.set_processing(false);
        }
    }

    state.set_processing(false);
}
