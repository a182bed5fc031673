//! Thread-safety checks for the shared client types.
//!
//! Clients and gates are shared across tasks, so they and the trait objects
//! they hold must be `Send + Sync`.

use apibase_core::classifier::{DefaultClassifier, ErrorClassifier, SuccessFlagClassifier};
use apibase_core::codec::{JsonCodec, PayloadCodec};
use apibase_core::error::Result;
use apibase_core::throttle::{ThrottleConfig, ThrottleGate};
use apibase_core::request::RequestDescriptor;
use apibase_core::response::HttpResponse;
use apibase_core::transport::Transport;
use apibase_core::ws_client::{WsApiClient, WsMessageHandler};
use apibase_core::{ApiClient, ClientConfig};
use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn assert_send_sync<T: Send + Sync>() {}

#[derive(Debug, Default)]
struct CountingTransport {
    sent: AtomicUsize,
}

#[async_trait]
impl Transport for CountingTransport {
    async fn send(&self, _request: &RequestDescriptor) -> Result<HttpResponse> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(HttpResponse::new(200, r#"{"ok":true}"#))
    }
}

#[test]
fn test_public_types_are_send_sync() {
    assert_send_sync::<ApiClient>();
    assert_send_sync::<ThrottleGate>();
    assert_send_sync::<WsApiClient>();
    assert_send_sync::<Arc<dyn Transport>>();
    assert_send_sync::<Arc<dyn ErrorClassifier>>();
    assert_send_sync::<Arc<dyn PayloadCodec>>();
    assert_send_sync::<Arc<dyn WsMessageHandler>>();
    assert_send_sync::<DefaultClassifier>();
    assert_send_sync::<SuccessFlagClassifier>();
    assert_send_sync::<JsonCodec>();
}

fn run_concurrently(tasks: usize) -> Result<usize> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_time()
        .build()
        .map_err(|e| apibase_core::Error::initialization(e.to_string()))?;

    runtime.block_on(async move {
        let gate = ThrottleGate::new(ThrottleConfig::new(Duration::ZERO));
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..tasks)
            .map(|_| {
                let gate = gate.clone();
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                tokio::spawn(async move {
                    gate.execute(|| async {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .await
                })
            })
            .collect();

        let mut completed = 0;
        for handle in handles {
            if matches!(handle.await, Ok(Ok(()))) {
                completed += 1;
            }
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        Ok(completed)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_gate_never_overlaps_across_threads(tasks in 1usize..10) {
        let completed = run_concurrently(tasks).unwrap();
        prop_assert_eq!(completed, tasks);
    }
}

#[tokio::test]
async fn test_client_shared_across_tasks() {
    let transport = Arc::new(CountingTransport::default());

    let client = ApiClient::builder(
        ClientConfig::builder()
            .base_path("https://api.example.com")
            .use_throttle(false)
            .build(),
    )
    .shared_transport(transport.clone())
    .build()
    .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get::<serde_json::Value>("/ping").await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(client.request_count(), 4);
    assert_eq!(transport.sent.load(Ordering::SeqCst), 4);
}
