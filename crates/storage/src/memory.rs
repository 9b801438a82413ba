//! In-memory storage backend implementation.
//!
//! This module provides [`MemoryBackend`], an in-memory implementation of
//! [`StorageBackend`] suitable for testing and development.
//!
//! # Features
//!
//! - **Thread-safe**: Uses [`parking_lot::RwLock`] for concurrent access
//! - **Ordered storage**: Keys are stored in a [`BTreeMap`], so snapshots list keys in order
//! - **Size limits**: Optional [`SizeLimits`]; every key is checked, written values too
//! - **Fail points**: With the `failpoints` feature, `memory-get`, `memory-set` and
//!   `memory-delete` can be configured to inject errors
//!
//! # Example
//!
//! ```
//! use kyc_storage::{MemoryBackend, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MemoryBackend::new();
//!
//!     backend.set(b"greeting".to_vec(), b"hello".to_vec()).await.unwrap();
//!     let value = backend.get(b"greeting").await.unwrap();
//!
//!     assert_eq!(value.unwrap().as_ref(), b"hello");
//! }
//! ```
//!
//! # Limitations
//!
//! - Data is not persisted; all data is lost when the process exits
//! - No replication or distributed features

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use fail::fail_point;
use parking_lot::RwLock;

use crate::{
    backend::StorageBackend,
    error::{StorageError, StorageResult},
    size_limits::{SizeLimits, validate_key_size, validate_sizes},
};

/// In-memory storage backend using [`BTreeMap`].
///
/// # Cloning
///
/// `MemoryBackend` is cheaply cloneable via [`Arc`]. All clones share the
/// same underlying data store.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Bytes>>>,
    size_limits: Option<SizeLimits>,
}

impl MemoryBackend {
    /// Creates a new, empty in-memory storage backend without size limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new backend that rejects keys and values larger than `limits`.
    ///
    /// # Example
    ///
    /// ```
    /// use kyc_storage::{MemoryBackend, SizeLimits};
    ///
    /// let limits = SizeLimits::new(64, 4096).unwrap();
    /// let backend = MemoryBackend::with_size_limits(limits);
    /// assert_eq!(backend.size_limits(), Some(limits));
    /// ```
    #[must_use]
    pub fn with_size_limits(limits: SizeLimits) -> Self {
        Self { data: Arc::default(), size_limits: Some(limits) }
    }

    /// Returns the configured size limits, if any.
    #[must_use]
    pub fn size_limits(&self) -> Option<SizeLimits> {
        self.size_limits
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Returns all stored keys in byte order.
    #[must_use]
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.data.read().keys().cloned().collect()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("keys", &self.len())
            .field("size_limits", &self.size_limits)
            .finish()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    #[tracing::instrument(skip(self, key), fields(key = %String::from_utf8_lossy(key)))]
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        fail_point!("memory-get", |_| Err(StorageError::internal("injected failure: memory-get")));

        if let Some(limits) = &self.size_limits {
            validate_key_size(key, limits)?;
        }

        let data = self.data.read();
        Ok(data.get(key).cloned())
    }

    #[tracing::instrument(
        skip(self, key, value),
        fields(key = %String::from_utf8_lossy(&key), value_len = value.len())
    )]
    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        fail_point!("memory-set", |_| Err(StorageError::internal("injected failure: memory-set")));

        if let Some(limits) = &self.size_limits {
            validate_sizes(&key, &value, limits)?;
        }

        let mut data = self.data.write();
        data.insert(key, Bytes::from(value));
        Ok(())
    }

    #[tracing::instrument(skip(self, key), fields(key = %String::from_utf8_lossy(key)))]
    async fn delete(&self, key: &[u8]) -> StorageResult<()> {
        fail_point!("memory-delete", |_| {
            Err(StorageError::internal("injected failure: memory-delete"))
        });

        if let Some(limits) = &self.size_limits {
            validate_key_size(key, limits)?;
        }

        let mut data = self.data.write();
        data.remove(key);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn health_check(&self) -> StorageResult<()> {
        // Acquiring the read lock proves the store is not deadlocked.
        let _unused = self.data.read();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let backend = MemoryBackend::new();

        backend.set(b"key1".to_vec(), b"value1".to_vec()).await.unwrap();
        let value = backend.get(b"key1").await.unwrap();
        assert_eq!(value, Some(Bytes::from("value1")));

        backend.delete(b"key1").await.unwrap();
        let value = backend.get(b"key1").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let backend = MemoryBackend::new();
        let clone = backend.clone();

        clone.set(b"shared".to_vec(), b"yes".to_vec()).await.unwrap();
        assert_eq!(backend.get(b"shared").await.unwrap(), Some(Bytes::from("yes")));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_listed_in_order() {
        let backend = MemoryBackend::new();
        for key in [b"carol".as_slice(), b"alice", b"bob"] {
            backend.set(key.to_vec(), b"{}".to_vec()).await.unwrap();
        }

        assert_eq!(backend.keys(), vec![b"alice".to_vec(), b"bob".to_vec(), b"carol".to_vec()]);
    }

    #[tokio::test]
    async fn test_value_over_limit_is_rejected_and_not_stored() {
        let backend = MemoryBackend::with_size_limits(SizeLimits::new(16, 8).unwrap());

        let err = backend.set(b"log".to_vec(), vec![b'x'; 9]).await.unwrap_err();
        assert!(matches!(err, StorageError::SizeLimitExceeded { actual: 9, limit: 8, .. }));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_key_rejected_on_read() {
        let backend = MemoryBackend::with_size_limits(SizeLimits::new(4, 8).unwrap());

        let err = backend.get(b"too-long-key").await.unwrap_err();
        assert!(matches!(err, StorageError::SizeLimitExceeded { ref kind, .. } if kind == "key"));
    }

    #[tokio::test]
    async fn test_oversized_key_rejected_on_delete() {
        let backend = MemoryBackend::with_size_limits(SizeLimits::new(4, 8).unwrap());
        backend.set(b"ok".to_vec(), b"v".to_vec()).await.unwrap();

        let err = backend.delete(b"too-long-key").await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::SizeLimitExceeded { ref kind, actual: 12, limit: 4 } if kind == "key"
        ));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        let backend = MemoryBackend::new();
        assert!(backend.health_check().await.is_ok());
    }
}
