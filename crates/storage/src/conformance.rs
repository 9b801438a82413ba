//! Conformance test suite for [`StorageBackend`] implementations.
//!
//! Each function checks one clause of the backend contract the registry
//! relies on. Any backend can run the suite with a fresh instance:
//!
//! ```no_run
//! use kyc_storage::{MemoryBackend, conformance};
//!
//! #[tokio::test]
//! async fn get_returns_none_for_missing_key() {
//!     conformance::get_returns_none_for_missing_key(&MemoryBackend::new()).await;
//! }
//! ```
//!
//! | Category | Contract aspect |
//! |----------|-----------------|
//! | CRUD | get/set/delete semantics, byte-exact values |
//! | Concurrent | per-key atomicity under parallel writers |
//! | Health | `health_check` succeeds on a fresh backend |

use std::sync::Arc;

use bytes::Bytes;

use crate::backend::StorageBackend;

// ============================================================================
// CRUD
// ============================================================================

/// `get` on a nonexistent key returns `Ok(None)`, not an error.
pub async fn get_returns_none_for_missing_key<B: StorageBackend>(backend: &B) {
    let result = backend.get(b"nonexistent").await;
    assert!(result.is_ok(), "get should not error on missing key: {result:?}");
    assert_eq!(result.expect("checked above"), None, "missing key should return None");
}

/// `set` then `get` returns the exact bytes written.
pub async fn set_then_get_returns_value<B: StorageBackend>(backend: &B) {
    let value = br#"{"id":"alice","infoElements":[]}"#;
    backend.set(b"alice".to_vec(), value.to_vec()).await.expect("set should succeed");
    let val = backend.get(b"alice").await.expect("get should succeed");
    assert_eq!(val, Some(Bytes::from_static(value)));
}

/// `set` on an existing key replaces the whole value.
pub async fn set_overwrites_existing<B: StorageBackend>(backend: &B) {
    backend.set(b"k1".to_vec(), b"a much longer original".to_vec()).await.expect("set");
    backend.set(b"k1".to_vec(), b"short".to_vec()).await.expect("overwrite");
    let val = backend.get(b"k1").await.expect("get");
    assert_eq!(val, Some(Bytes::from("short")), "overwrite must not leave a tail of the old value");
}

/// `delete` on a nonexistent key is a silent no-op.
pub async fn delete_nonexistent_is_noop<B: StorageBackend>(backend: &B) {
    let result = backend.delete(b"ghost").await;
    assert!(result.is_ok(), "delete of nonexistent key should not error: {result:?}");
}

/// `delete` removes a previously-set key and leaves others untouched.
pub async fn delete_removes_only_that_key<B: StorageBackend>(backend: &B) {
    backend.set(b"k2".to_vec(), b"val".to_vec()).await.expect("set");
    backend.set(b"k3".to_vec(), b"other".to_vec()).await.expect("set");
    backend.delete(b"k2").await.expect("delete");
    assert_eq!(backend.get(b"k2").await.expect("get after delete"), None);
    assert_eq!(backend.get(b"k3").await.expect("get neighbour"), Some(Bytes::from("other")));
}

/// Keys are byte-level distinct: `"key"` and `"key\x00"` are different.
pub async fn keys_are_byte_distinct<B: StorageBackend>(backend: &B) {
    backend.set(b"key".to_vec(), b"a".to_vec()).await.expect("set key");
    backend.set(b"key\x00".to_vec(), b"b".to_vec()).await.expect("set key+null");
    assert_eq!(backend.get(b"key").await.expect("get key"), Some(Bytes::from("a")));
    assert_eq!(backend.get(b"key\x00").await.expect("get key+null"), Some(Bytes::from("b")));
}

/// Values are stored byte-for-byte, including non-canonical whitespace.
pub async fn values_are_byte_exact<B: StorageBackend>(backend: &B) {
    let value = b"{ \"id\" : \"bob\",\n  \"infoElements\": [] }".to_vec();
    backend.set(b"bob".to_vec(), value.clone()).await.expect("set");
    assert_eq!(backend.get(b"bob").await.expect("get"), Some(Bytes::from(value)));
}

// ============================================================================
// Concurrent
// ============================================================================

/// Parallel writers to one key leave exactly one of the written values.
pub async fn concurrent_writes_to_same_key_are_atomic<B: StorageBackend + 'static>(
    backend: Arc<B>,
) {
    let mut handles = Vec::new();
    for task in 0..8 {
        let backend = Arc::clone(&backend);
        handles.push(tokio::spawn(async move {
            let value = format!("writer-{task}").repeat(64).into_bytes();
            backend.set(b"contended".to_vec(), value).await.expect("concurrent set");
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked");
    }

    let stored = backend.get(b"contended").await.expect("get").expect("value present");
    let winner = (0..8)
        .map(|task| format!("writer-{task}").repeat(64))
        .find(|v| v.as_bytes() == stored.as_ref());
    assert!(winner.is_some(), "stored value must be one complete write, got {} bytes", stored.len());
}

/// Parallel writers to distinct keys all succeed.
pub async fn concurrent_writes_to_distinct_keys<B: StorageBackend + 'static>(backend: Arc<B>) {
    let mut handles = Vec::new();
    for task in 0..16 {
        let backend = Arc::clone(&backend);
        handles.push(tokio::spawn(async move {
            let key = format!("person-{task:02}").into_bytes();
            backend.set(key, b"{}".to_vec()).await.expect("concurrent set");
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked");
    }

    for task in 0..16 {
        let key = format!("person-{task:02}");
        assert!(backend.get(key.as_bytes()).await.expect("get").is_some(), "{key} missing");
    }
}

// ============================================================================
// Health
// ============================================================================

/// A fresh backend reports healthy.
pub async fn health_check_succeeds<B: StorageBackend>(backend: &B) {
    let result = backend.health_check().await;
    assert!(result.is_ok(), "fresh backend should be healthy: {result:?}");
}

/// Runs every conformance check, each against a fresh backend from `factory`.
pub async fn run_all<B, F>(factory: F)
where
    B: StorageBackend + 'static,
    F: Fn() -> B,
{
    get_returns_none_for_missing_key(&factory()).await;
    set_then_get_returns_value(&factory()).await;
    set_overwrites_existing(&factory()).await;
    delete_nonexistent_is_noop(&factory()).await;
    delete_removes_only_that_key(&factory()).await;
    keys_are_byte_distinct(&factory()).await;
    values_are_byte_exact(&factory()).await;
    concurrent_writes_to_same_key_are_atomic(Arc::new(factory())).await;
    concurrent_writes_to_distinct_keys(Arc::new(factory())).await;
    health_check_succeeds(&factory()).await;
}
