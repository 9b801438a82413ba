//! Storage error types and result alias.
//!
//! All storage backends map their internal failures onto [`StorageError`] so
//! the record layer above them can treat every backend the same way.
//!
//! # Error Types
//!
//! - [`StorageError::NotFound`] - A key the caller required does not exist
//! - [`StorageError::Connection`] - Network or connection-related failures
//! - [`StorageError::SizeLimitExceeded`] - Key or value larger than the configured limit
//! - [`StorageError::Internal`] - Backend-specific internal errors
//!
//! # Example
//!
//! ```
//! use kyc_storage::{StorageError, StorageResult};
//!
//! fn lookup(key: &str) -> StorageResult<Vec<u8>> {
//!     Err(StorageError::not_found(key))
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// Errors preserve their source chain via the `#[source]` attribute, enabling
/// debugging tools to display the full error context.
///
/// This enum is `#[non_exhaustive]`; downstream matches need a wildcard arm.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// A key the caller required was not found.
    ///
    /// Plain `get` never produces this (it returns `Ok(None)`); it is raised
    /// by layers that need a key to exist, e.g. an uninitialized record.
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was not found.
        key: String,
    },

    /// Connection or network error.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// A key or value exceeded the backend's configured size limit.
    #[error("{kind} size {actual} exceeds limit of {limit} bytes")]
    SizeLimitExceeded {
        /// Which part of the write was too large (`"key"` or `"value"`).
        kind: String,
        /// Actual size in bytes.
        actual: usize,
        /// Configured maximum in bytes.
        limit: usize,
    },

    /// Internal storage backend error.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error for the given key.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `SizeLimitExceeded` error.
    #[must_use]
    pub fn size_limit_exceeded(kind: impl Into<String>, actual: usize, limit: usize) -> Self {
        Self::SizeLimitExceeded { kind: kind.into(), actual, limit }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Returns `true` for failures a caller may reasonably retry.
    ///
    /// Only connection failures qualify. Nothing in this workspace retries
    /// automatically; the classification exists for callers.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Errors raised when validating configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A numeric field is below its allowed minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum accepted value.
        min: String,
        /// Value that was supplied.
        value: String,
    },

    /// A string field that must be non-empty was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn not_found_names_the_key() {
        let err = StorageError::not_found("SUBMITTED_REQUESTS_ID");
        assert_eq!(err.to_string(), "Key not found: SUBMITTED_REQUESTS_ID");
    }

    #[test]
    fn source_chain_is_preserved() {
        let io = std::io::Error::other("socket closed");
        let err = StorageError::connection_with_source("ledger unreachable", io);
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("socket closed"));
    }

    #[test]
    fn only_connection_errors_are_transient() {
        assert!(StorageError::connection("down").is_transient());
        assert!(!StorageError::internal("boom").is_transient());
        assert!(!StorageError::not_found("k").is_transient());
        assert!(!StorageError::size_limit_exceeded("value", 10, 5).is_transient());
    }

    #[test]
    fn every_variant_renders_a_message() {
        let all = [
            StorageError::not_found("k"),
            StorageError::connection("down"),
            StorageError::size_limit_exceeded("value", 10, 5),
            StorageError::internal("boom"),
        ];
        for err in all {
            // exhaustive: a new variant must be added to this list
            let expected = match &err {
                StorageError::NotFound { .. } => "Key not found: k",
                StorageError::Connection { .. } => "Connection error: down",
                StorageError::SizeLimitExceeded { .. } => "value size 10 exceeds limit of 5 bytes",
                StorageError::Internal { .. } => "Internal error: boom",
            };
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn size_limit_message_names_kind_and_sizes() {
        let err = StorageError::size_limit_exceeded("key", 600, 512);
        assert_eq!(err.to_string(), "key size 600 exceeds limit of 512 bytes");
    }

    #[test]
    fn config_error_messages() {
        let err = ConfigError::Empty { field: "submissions_key" };
        assert_eq!(err.to_string(), "submissions_key must not be empty");

        let err = ConfigError::BelowMinimum { field: "max_key_size", min: "1".into(), value: "0".into() };
        assert_eq!(err.to_string(), "max_key_size must be at least 1, got 0");
    }
}
