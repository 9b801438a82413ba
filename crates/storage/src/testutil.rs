//! Shared test utilities for storage backend testing.
//!
//! Feature-gated behind `testutil` so it never leaks into production builds.
//!
//! ```toml
//! [dev-dependencies]
//! kyc-storage = { path = "../storage", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use kyc_storage::testutil::{FailingBackend, Failure, seeded_backend};
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::{
    StorageBackend,
    error::{StorageError, StorageResult},
    memory::MemoryBackend,
};

/// Create a [`MemoryBackend`] pre-populated with the given UTF-8 key/value pairs.
///
/// # Panics
///
/// Panics if any `set` operation fails (should not happen with `MemoryBackend`).
pub async fn seeded_backend<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> MemoryBackend {
    let backend = MemoryBackend::new();
    for (key, value) in entries {
        backend
            .set(key.as_bytes().to_vec(), value.as_bytes().to_vec())
            .await
            .expect("seed set failed");
    }
    backend
}

/// Which backend operation a [`FailingBackend`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Every `get` fails.
    Get,
    /// Every `set` fails.
    Set,
    /// Every `delete` fails.
    Delete,
    /// Only the `n`th `set` (zero-based) fails.
    NthSet(usize),
}

/// A wrapper around [`MemoryBackend`] that injects connection failures.
///
/// Failures are configured per operation and can be changed between calls,
/// so a test can set up state through the wrapper and then break it.
#[derive(Clone, Default)]
pub struct FailingBackend {
    inner: MemoryBackend,
    failures: Arc<Mutex<Vec<Failure>>>,
    set_count: Arc<AtomicUsize>,
}

impl FailingBackend {
    /// Wraps `inner` with no failures configured.
    #[must_use]
    pub fn new(inner: MemoryBackend) -> Self {
        Self { inner, ..Self::default() }
    }

    /// Adds a failure mode.
    pub fn fail(&self, failure: Failure) {
        self.failures.lock().push(failure);
    }

    /// Removes every configured failure.
    pub fn heal(&self) {
        self.failures.lock().clear();
    }

    /// Returns the wrapped backend for direct inspection.
    #[must_use]
    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    /// Returns how many `set` calls reached the wrapper, failed or not.
    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.set_count.load(Ordering::SeqCst)
    }

    fn should_fail(&self, failure: Failure) -> bool {
        self.failures.lock().contains(&failure)
    }
}

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        if self.should_fail(Failure::Get) {
            return Err(StorageError::connection("simulated get failure"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        let idx = self.set_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(Failure::Set) || self.should_fail(Failure::NthSet(idx)) {
            return Err(StorageError::connection("simulated set failure"));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<()> {
        if self.should_fail(Failure::Delete) {
            return Err(StorageError::connection("simulated delete failure"));
        }
        self.inner.delete(key).await
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.inner.health_check().await
    }
}

/// Assert that a [`StorageResult`] is a [`StorageError::NotFound`].
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use kyc_storage::{StorageError, StorageResult, assert_not_found};
///
/// let result: StorageResult<()> = Err(StorageError::not_found("missing"));
/// assert_not_found!(result);
/// ```
#[macro_export]
macro_rules! assert_not_found {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::NotFound { .. })),
            "expected StorageError::NotFound, got: {:?}",
            $result,
        );
    };
}

/// Assert that a [`StorageResult`] is `Ok`, returning the inner value.
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use kyc_storage::{StorageResult, assert_storage_ok};
///
/// let result: StorageResult<i32> = Ok(42);
/// assert_eq!(assert_storage_ok!(result), 42);
/// ```
#[macro_export]
macro_rules! assert_storage_ok {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("expected Ok, got StorageError: {e:?}"),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("{}: expected Ok, got StorageError: {e:?}", $msg),
        }
    };
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_backend() {
        let backend = seeded_backend([("alice", "{}"), ("bob", "[]")]).await;
        assert_eq!(backend.len(), 2);
        assert_eq!(backend.get(b"bob").await.expect("get"), Some(Bytes::from("[]")));
    }

    #[tokio::test]
    async fn test_failing_backend_fails_configured_operation_only() {
        let backend = FailingBackend::new(MemoryBackend::new());
        backend.fail(Failure::Set);

        let err = backend.set(b"k".to_vec(), b"v".to_vec()).await.expect_err("set should fail");
        assert!(err.is_transient());
        assert!(backend.get(b"k").await.expect("get still works").is_none());
        assert!(backend.delete(b"k").await.is_ok());
    }

    #[tokio::test]
    async fn test_nth_set_failure() {
        let backend = FailingBackend::new(MemoryBackend::new());
        backend.fail(Failure::NthSet(1));

        assert!(backend.set(b"a".to_vec(), b"1".to_vec()).await.is_ok());
        assert!(backend.set(b"b".to_vec(), b"2".to_vec()).await.is_err());
        assert!(backend.set(b"c".to_vec(), b"3".to_vec()).await.is_ok());
        assert_eq!(backend.set_calls(), 3);
        assert_eq!(backend.inner().keys(), vec![b"a".to_vec(), b"c".to_vec()]);
    }

    #[tokio::test]
    async fn test_heal_clears_failures() {
        let backend = FailingBackend::new(MemoryBackend::new());
        backend.fail(Failure::Get);
        assert!(backend.get(b"k").await.is_err());

        backend.heal();
        assert!(backend.get(b"k").await.is_ok());
    }

    #[test]
    fn test_assert_not_found_macro() {
        let result: StorageResult<()> = Err(StorageError::not_found("missing"));
        assert_not_found!(result);
    }

    #[test]
    fn test_assert_storage_ok_macro() {
        let result: StorageResult<i32> = Ok(42);
        assert_eq!(assert_storage_ok!(result), 42);
    }
}
