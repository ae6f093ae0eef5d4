//! Orchestration Tests
//!
//! End-to-end behaviour of `ContentGenerator` on a paused clock: pacing,
//! ordering, retry classes and cache interplay.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_gateway::{
    cache::ResponseCache, client::ContentModel, retry::RetryConfig, AiError, ContentGenerator,
    Source,
};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use tokio::time::Instant;

const GAP: Duration = Duration::from_secs(4);

/// Records when each prompt started and replays scripted replies.
#[derive(Default)]
struct RecordingModel {
    replies: Mutex<VecDeque<ai_gateway::Result<String>>>,
    starts: Mutex<Vec<(String, Instant)>>,
    latency: Duration,
}

impl RecordingModel {
    fn prompts(&self) -> Vec<String> {
        self.starts.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    fn start_times(&self) -> Vec<Instant> {
        self.starts.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl ContentModel for RecordingModel {
    async fn generate(&self, prompt: &str) -> ai_gateway::Result<String> {
        self.starts
            .lock()
            .unwrap()
            .push((prompt.to_string(), Instant::now()));
        tokio::time::sleep(self.latency).await;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!(r#"{{"echo":"{}"}}"#, prompt)))
    }
}

fn generator_with(model: Arc<RecordingModel>, retry: RetryConfig) -> ContentGenerator {
    ContentGenerator::new(
        model,
        ResponseCache::new(100, Duration::from_secs(300)),
        GAP,
        retry,
    )
}

fn quick_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(2),
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_are_fifo_and_spaced() {
    let model = Arc::new(RecordingModel {
        latency: Duration::from_millis(700),
        ..RecordingModel::default()
    });
    let generator = generator_with(model.clone(), quick_retry(0));
    let prompts: Vec<String> = (0..6).map(|i| format!("prompt-{}", i)).collect();

    let results = join_all(
        prompts
            .iter()
            .map(|p| generator.generate_content(p, None, None)),
    )
    .await;

    for (prompt, result) in prompts.iter().zip(results) {
        assert_eq!(result.unwrap().data, json!({ "echo": prompt }));
    }
    assert_eq!(model.prompts(), prompts);
    for pair in model.start_times().windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= GAP);
    }
}

#[tokio::test(start_paused = true)]
async fn test_retries_stay_inside_one_queue_slot() {
    let model = Arc::new(RecordingModel {
        replies: Mutex::new(
            vec![
                Err(AiError::Upstream("500".into())),
                Ok(r#"{"n":1}"#.into()),
                Ok(r#"{"n":2}"#.into()),
            ]
            .into(),
        ),
        ..RecordingModel::default()
    });
    let generator = generator_with(model.clone(), quick_retry(3));

    let (first, second) = tokio::join!(
        generator.generate_content("first", None, None),
        generator.generate_content("second", None, None),
    );

    assert_eq!(first.unwrap().data, json!({"n": 1}));
    assert_eq!(second.unwrap().data, json!({"n": 2}));
    assert_eq!(model.prompts(), vec!["first", "first", "second"]);

    let starts = model.start_times();
    // Backoff between attempts, full gap before the next queued request
    assert!(starts[1].duration_since(starts[0]) >= Duration::from_millis(500));
    assert!(starts[1].duration_since(starts[0]) < GAP);
    assert!(starts[2].duration_since(starts[1]) >= GAP);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_request_does_not_block_the_next() {
    let model = Arc::new(RecordingModel {
        replies: Mutex::new(vec![Err(AiError::RateLimited("429".into()))].into()),
        ..RecordingModel::default()
    });
    let generator = generator_with(model.clone(), quick_retry(5));

    let (first, second) = tokio::join!(
        generator.generate_content("first", Some("k1"), None),
        generator.generate_content("second", Some("k2"), None),
    );

    assert!(first.unwrap_err().is_rate_limited());
    assert_eq!(second.unwrap().source, Source::Ai);
    assert_eq!(model.prompts(), vec!["first", "second"]);

    let starts = model.start_times();
    assert!(starts[1].duration_since(starts[0]) >= GAP);
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_calls_hit_model_once() {
    let model = Arc::new(RecordingModel::default());
    let generator = generator_with(model.clone(), quick_retry(0));

    let first = generator
        .generate_content("same", Some("key"), Some(Duration::from_secs(60)))
        .await
        .unwrap();
    let second = generator
        .generate_content("same", Some("key"), Some(Duration::from_secs(60)))
        .await
        .unwrap();

    assert_eq!(first.source, Source::Ai);
    assert_eq!(second.source, Source::Cache);
    assert_eq!(first.data, second.data);
    assert_eq!(model.prompts().len(), 1);
    assert_eq!(generator.cache_stats().await.total_entries, 1);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_reports_waiting_requests() {
    let model = Arc::new(RecordingModel {
        latency: Duration::from_secs(1),
        ..RecordingModel::default()
    });
    let generator = Arc::new(generator_with(model.clone(), quick_retry(0)));

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let generator = generator.clone();
            tokio::spawn(async move {
                generator
                    .generate_content(&format!("p{}", i), None, None)
                    .await
            })
        })
        .collect();

    // First request is in flight, the other two wait behind it
    tokio::time::sleep(Duration::from_millis(500)).await;
    let snapshot = generator.rate_limit_state();
    assert!(snapshot.is_processing);
    assert_eq!(snapshot.queue_length, 2);

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let snapshot = generator.rate_limit_state();
    assert_eq!(snapshot.queue_length, 0);
    assert!(!snapshot.is_processing);
}
