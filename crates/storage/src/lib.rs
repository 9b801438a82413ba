//! Key-value storage backend abstraction for the KYC registry.
//!
//! This crate provides the [`StorageBackend`] trait that the registry's
//! record stores are written against, the canonical [`StorageError`] type,
//! and [`MemoryBackend`] for development and tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Dispatcher                               │
//! │        (named operation + string arguments → Operation)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   Record Layer (kyc-registry)               │
//! │          EntityStore          │        SubmissionLog        │
//! │     (person aggregates, element upsert/delete, codecs)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   kyc-storage                               │
//! │              StorageBackend trait                           │
//! │                (get, set, delete)                           │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │ MemoryBackend│         ledger-backed implementations        │
//! │   (testing)  │              (external)                      │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use kyc_storage::{MemoryBackend, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MemoryBackend::new();
//!
//!     backend.set(b"alice".to_vec(), br#"{"id":"alice"}"#.to_vec()).await?;
//!     let value = backend.get(b"alice").await?;
//!     assert_eq!(value.map(|b| b.to_vec()), Some(br#"{"id":"alice"}"#.to_vec()));
//!
//!     backend.delete(b"alice").await?;
//!     assert!(backend.get(b"alice").await?.is_none());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the [`testutil`] and [`conformance`] modules (seeded backends,
//!   failure injection, assertion macros, backend contract checks).
//! - **`failpoints`**: Enables `fail` crate fail points inside [`MemoryBackend`].

#![deny(unsafe_code)]

pub mod backend;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod conformance;
pub mod error;
pub mod memory;
pub mod size_limits;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod testutil;

pub use backend::StorageBackend;
pub use error::{BoxError, ConfigError, StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use size_limits::{
    DEFAULT_MAX_KEY_SIZE, DEFAULT_MAX_VALUE_SIZE, SizeLimits, validate_key_size, validate_sizes,
};
