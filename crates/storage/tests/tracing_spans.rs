//! Integration test verifying that `#[instrument]` annotations produce
//! the expected spans on `MemoryBackend` operations.

#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use kyc_storage::{MemoryBackend, StorageBackend};
use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan};

// ---------------------------------------------------------------------------
// Collecting layer — records span names as they are created
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct SpanCollector {
    spans: Arc<Mutex<Vec<String>>>,
}

impl<S> tracing_subscriber::Layer<S> for SpanCollector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        _attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            self.spans.lock().expect("lock poisoned").push(span.name().to_owned());
        }
    }
}

fn recorded(spans: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    spans.lock().expect("lock poisoned").clone()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn memory_backend_operations_create_spans() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let backend = MemoryBackend::new();
    backend.set(b"alice".to_vec(), b"{}".to_vec()).await.expect("set should succeed");
    let _ = backend.get(b"alice").await;
    backend.delete(b"alice").await.expect("delete should succeed");
    backend.health_check().await.expect("health check should succeed");

    let recorded = recorded(&spans);
    for name in ["set", "get", "delete", "health_check"] {
        assert!(recorded.iter().any(|s| s == name), "expected a '{name}' span, got: {recorded:?}");
    }
}
