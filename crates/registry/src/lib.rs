//! Person and submission record management over a key-value ledger.
//!
//! The registry keeps two kinds of records in any [`StorageBackend`](kyc_storage::StorageBackend):
//!
//! - **Persons** ([`EntityStore`]): one JSON value per person id, holding
//!   an ordered list of [`InfoElement`]s addressed by their own ids.
//! - **Submissions** ([`SubmissionLog`]): one JSON array at a fixed key,
//!   holding [`SubmittedRequest`]s, each a snapshot of a person.
//!
//! Both read a whole record, transform it in memory and write it back. The
//! backend serializes access per key but nothing guards the gap between the
//! read and the write, so concurrent mutations of one record can lose
//! updates.
//!
//! [`Registry`] puts both behind the named-operation interface callers use
//! (`createPerson`, `updateInfoElement`, `saveSubmittedRequest`, ...).
//!
//! # Quick Start
//!
//! ```
//! use kyc_registry::Registry;
//! use kyc_storage::MemoryBackend;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), kyc_registry::RegistryError> {
//! let registry = Registry::new(MemoryBackend::new());
//!
//! registry.invoke::<&str>("init", &[]).await?;
//! registry.invoke("createPerson", &["alice"]).await?;
//! registry.invoke("updateInfoElement", &["alice", r#"{"id":"doc1","hash":"abc"}"#]).await?;
//! registry.invoke("saveSubmittedRequest", &["req1", "alice"]).await?;
//!
//! let element = registry.query("queryInfoElement", &["alice", "doc1"]).await?;
//! let element: kyc_registry::InfoElement = serde_json::from_slice(&element).unwrap();
//! assert_eq!(element.hash, "abc");
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the [`testutil`] module (record builders, registry
//!   factories, [`assert_registry_error!`]).

#![deny(unsafe_code)]

mod codec;
pub mod config;
pub mod dispatch;
pub mod entity_store;
pub mod error;
pub mod records;
pub mod submission_log;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod testutil;

pub use config::{
    ConfigError, DEFAULT_SUBMISSION_VERSION, DEFAULT_SUBMISSIONS_KEY, DEFAULT_SUBMITTED_ON,
    RegistryConfig,
};
pub use dispatch::{Operation, Registry};
pub use entity_store::EntityStore;
pub use error::{RegistryError, RegistryResult};
pub use records::{ElementId, InfoElement, Person, SubmissionRecord, SubmittedRequest, Upsert};
pub use submission_log::SubmissionLog;
