//! Error types for the record layer.
//!
//! Every registry operation returns [`RegistryResult`]. Failures are never
//! retried internally; the first failing step ends the operation and is
//! returned as-is.
//!
//! # Recoverable vs. fatal
//!
//! [`NotFound`](RegistryError::NotFound),
//! [`ElementNotFound`](RegistryError::ElementNotFound),
//! [`RequestNotFound`](RegistryError::RequestNotFound) and
//! [`DuplicateSubmission`](RegistryError::DuplicateSubmission) are expected
//! outcomes callers branch on ([`RegistryError::is_recoverable`]). Backend and
//! serialization failures abort the current operation.
//!
//! # Error payloads
//!
//! Callers at the dispatch boundary receive errors as a structured payload of
//! the form `{"Error":"<message>"}`, see [`RegistryError::to_payload`].

use kyc_storage::StorageError;
use thiserror::Error;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors produced by the entity store, the submission log and the dispatcher.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// An operation was invoked with the wrong number of arguments.
    #[error("Incorrect number of arguments for {operation}. Expecting {expected}, got {actual}")]
    InvalidArgumentCount {
        /// Operation name as invoked.
        operation: String,
        /// Number of arguments the operation takes.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },

    /// No operation with this name exists at the entry point used.
    #[error("Received unknown function invocation: {name}")]
    UnknownOperation {
        /// Operation name as invoked.
        name: String,
    },

    /// An argument failed a precondition (e.g. an empty id).
    #[error("Invalid argument {name}: {message}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// A well-formed record violates an aggregate invariant.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Description of the violated invariant.
        message: String,
    },

    /// The referenced person does not exist.
    #[error("Failed to get state for person with ({key}) GUID")]
    NotFound {
        /// Ledger key that was looked up.
        key: String,
    },

    /// The person exists but holds no element with this id.
    #[error("Info element ({element_id}) not found for person ({person_id})")]
    ElementNotFound {
        /// Owning person.
        person_id: String,
        /// Element id that was looked up.
        element_id: String,
    },

    /// No submission with this id exists in the log.
    #[error("Submitted request ({request_id}) not found")]
    RequestNotFound {
        /// Submission id that was looked up.
        request_id: String,
    },

    /// A submission with this id is already in the log.
    #[error("Submitted request ({request_id}) already exists")]
    DuplicateSubmission {
        /// Submission id that was rejected.
        request_id: String,
    },

    /// A payload or stored record could not be encoded or decoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// What was being encoded or decoded.
        message: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The backend failed to delete a person record.
    #[error("Failed to delete state for ({key})")]
    DeleteFailed {
        /// Ledger key being deleted.
        key: String,
        /// The backend failure.
        #[source]
        source: StorageError,
    },

    /// Any other backend failure.
    #[error("Backend error: {0}")]
    Backend(#[from] StorageError),
}

impl RegistryError {
    /// Creates a new `NotFound` error for the given person key.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a new `ElementNotFound` error.
    #[must_use]
    pub fn element_not_found(person_id: impl Into<String>, element_id: impl Into<String>) -> Self {
        Self::ElementNotFound { person_id: person_id.into(), element_id: element_id.into() }
    }

    /// Creates a new `RequestNotFound` error.
    #[must_use]
    pub fn request_not_found(request_id: impl Into<String>) -> Self {
        Self::RequestNotFound { request_id: request_id.into() }
    }

    /// Creates a new `DuplicateSubmission` error.
    #[must_use]
    pub fn duplicate_submission(request_id: impl Into<String>) -> Self {
        Self::DuplicateSubmission { request_id: request_id.into() }
    }

    /// Creates a new `InvalidArgument` error.
    #[must_use]
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument { name, message: message.into() }
    }

    /// Creates a new `InvalidRecord` error.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord { message: message.into() }
    }

    /// Creates a new `Serialization` error.
    #[must_use]
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization { message: message.into(), source }
    }

    /// Returns `true` for expected conditions a caller is meant to branch on.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::ElementNotFound { .. }
                | Self::RequestNotFound { .. }
                | Self::DuplicateSubmission { .. }
        )
    }

    /// Renders the error as the structured payload returned to callers.
    ///
    /// ```
    /// use kyc_registry::RegistryError;
    ///
    /// let payload = RegistryError::not_found("alice").to_payload();
    /// assert_eq!(payload, r#"{"Error":"Failed to get state for person with (alice) GUID"}"#);
    /// ```
    #[must_use]
    pub fn to_payload(&self) -> String {
        serde_json::json!({ "Error": self.to_string() }).to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn branchable_errors_are_recoverable() {
        assert!(RegistryError::not_found("p").is_recoverable());
        assert!(RegistryError::element_not_found("p", "e").is_recoverable());
        assert!(RegistryError::request_not_found("r").is_recoverable());
        assert!(RegistryError::duplicate_submission("r").is_recoverable());
    }

    #[test]
    fn backend_and_serialization_errors_are_fatal() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        assert!(!RegistryError::serialization("element", json_err).is_recoverable());
        assert!(!RegistryError::from(StorageError::connection("down")).is_recoverable());
        let delete = RegistryError::DeleteFailed {
            key: "p".into(),
            source: StorageError::internal("disk"),
        };
        assert!(!delete.is_recoverable());
    }

    #[test]
    fn payload_escapes_message() {
        let payload = RegistryError::element_not_found("al\"ice", "doc1").to_payload();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["Error"], "Info element (doc1) not found for person (al\"ice)");
    }

    #[test]
    fn delete_failed_keeps_backend_source() {
        let err = RegistryError::DeleteFailed {
            key: "alice".into(),
            source: StorageError::connection("ledger unreachable"),
        };
        assert_eq!(err.to_string(), "Failed to delete state for (alice)");
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Connection error: ledger unreachable"));
    }

    #[test]
    fn argument_count_message() {
        let err = RegistryError::InvalidArgumentCount {
            operation: "createPerson".into(),
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Incorrect number of arguments for createPerson. Expecting 1, got 2"
        );
    }
}
