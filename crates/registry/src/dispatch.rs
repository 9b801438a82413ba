//! Named-operation entry points.
//!
//! Callers address the registry with an operation name and a list of string
//! arguments. [`Operation::parse`] checks the name and the argument count
//! once, at the boundary, and produces a typed [`Operation`];
//! [`Registry::execute`] runs it against the entity store or the
//! submission log.
//!
//! | Operation               | Arguments                      | Entry point |
//! |-------------------------|--------------------------------|-------------|
//! | `init`                  | none                           | invoke      |
//! | `createPerson`          | person id                      | invoke      |
//! | `updatePerson`          | person JSON                    | invoke      |
//! | `queryPerson`           | person id                      | query       |
//! | `deletePerson`          | person id                      | invoke      |
//! | `updateInfoElement`     | person id, element JSON        | invoke      |
//! | `deleteInfoElement`     | person id, element id          | invoke      |
//! | `queryInfoElement`      | person id, element id          | query       |
//! | `saveSubmittedRequest`  | request id, person id          | invoke      |
//! | `querySubmittedRequest` | request id                     | query       |
//!
//! `querySubmittedRequest` is the one element or submission operation that
//! takes a single argument: the request id alone addresses an entry in the
//! log, so no person id is accepted.
//!
//! [`Registry::invoke`] accepts every operation; [`Registry::query`] only the
//! read-only ones.

use bytes::Bytes;
use kyc_storage::StorageBackend;
use tracing::debug;

use crate::{
    config::{ConfigError, RegistryConfig},
    entity_store::EntityStore,
    error::{RegistryError, RegistryResult},
    submission_log::SubmissionLog,
};

/// Operation names and their argument counts.
const OPERATIONS: &[(&str, usize)] = &[
    ("init", 0),
    ("createPerson", 1),
    ("updatePerson", 1),
    ("queryPerson", 1),
    ("deletePerson", 1),
    ("updateInfoElement", 2),
    ("deleteInfoElement", 2),
    ("queryInfoElement", 2),
    ("saveSubmittedRequest", 2),
    ("querySubmittedRequest", 1),
];

/// A parsed registry operation with its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Initialize (or reset) the submission log.
    Init,
    /// Create an empty person.
    CreatePerson {
        /// Id of the new person.
        person_id: String,
    },
    /// Store a whole person supplied as JSON.
    UpdatePerson {
        /// Person JSON.
        payload: String,
    },
    /// Read a person.
    QueryPerson {
        /// Person to read.
        person_id: String,
    },
    /// Delete a person.
    DeletePerson {
        /// Person to delete.
        person_id: String,
    },
    /// Insert or replace an info element.
    UpdateInfoElement {
        /// Owning person.
        person_id: String,
        /// Element JSON.
        payload: String,
    },
    /// Delete an info element by id.
    DeleteInfoElement {
        /// Owning person.
        person_id: String,
        /// Element to delete.
        element_id: String,
    },
    /// Read an info element.
    QueryInfoElement {
        /// Owning person.
        person_id: String,
        /// Element to read.
        element_id: String,
    },
    /// Append a person snapshot to the submission log.
    SaveSubmittedRequest {
        /// Id of the new submission.
        request_id: String,
        /// Person to snapshot.
        person_id: String,
    },
    /// Read a submission.
    QuerySubmittedRequest {
        /// Submission to read.
        request_id: String,
    },
}

impl Operation {
    /// Returns the number of arguments the named operation takes, or `None`
    /// if no operation has that name.
    #[must_use]
    pub fn arity(name: &str) -> Option<usize> {
        OPERATIONS.iter().find(|(op, _)| *op == name).map(|(_, arity)| *arity)
    }

    /// Parses a named invocation.
    ///
    /// ```
    /// use kyc_registry::Operation;
    ///
    /// let op = Operation::parse("deleteInfoElement", &["alice", "doc1"])?;
    /// assert_eq!(
    ///     op,
    ///     Operation::DeleteInfoElement { person_id: "alice".into(), element_id: "doc1".into() }
    /// );
    ///
    /// assert!(Operation::parse("createPerson", &["alice", "extra"]).is_err());
    /// # Ok::<(), kyc_registry::RegistryError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownOperation`] if no operation has this name.
    /// - [`RegistryError::InvalidArgumentCount`] if the argument count is wrong.
    pub fn parse<S: AsRef<str>>(name: &str, args: &[S]) -> RegistryResult<Self> {
        let expected = Self::arity(name).ok_or_else(|| unknown(name))?;
        if args.len() != expected {
            return Err(RegistryError::InvalidArgumentCount {
                operation: name.to_owned(),
                expected,
                actual: args.len(),
            });
        }

        let owned: Vec<String> = args.iter().map(|a| a.as_ref().to_owned()).collect();
        let op = match (name, owned.as_slice()) {
            ("init", []) => Self::Init,
            ("createPerson", [person_id]) => Self::CreatePerson { person_id: person_id.clone() },
            ("updatePerson", [payload]) => Self::UpdatePerson { payload: payload.clone() },
            ("queryPerson", [person_id]) => Self::QueryPerson { person_id: person_id.clone() },
            ("deletePerson", [person_id]) => Self::DeletePerson { person_id: person_id.clone() },
            ("updateInfoElement", [person_id, payload]) => {
                Self::UpdateInfoElement { person_id: person_id.clone(), payload: payload.clone() }
            },
            ("deleteInfoElement", [person_id, element_id]) => Self::DeleteInfoElement {
                person_id: person_id.clone(),
                element_id: element_id.clone(),
            },
            ("queryInfoElement", [person_id, element_id]) => Self::QueryInfoElement {
                person_id: person_id.clone(),
                element_id: element_id.clone(),
            },
            ("saveSubmittedRequest", [request_id, person_id]) => Self::SaveSubmittedRequest {
                request_id: request_id.clone(),
                person_id: person_id.clone(),
            },
            ("querySubmittedRequest", [request_id]) => {
                Self::QuerySubmittedRequest { request_id: request_id.clone() }
            },
            _ => return Err(unknown(name)),
        };
        Ok(op)
    }

    /// Returns the operation name as invoked.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::CreatePerson { .. } => "createPerson",
            Self::UpdatePerson { .. } => "updatePerson",
            Self::QueryPerson { .. } => "queryPerson",
            Self::DeletePerson { .. } => "deletePerson",
            Self::UpdateInfoElement { .. } => "updateInfoElement",
            Self::DeleteInfoElement { .. } => "deleteInfoElement",
            Self::QueryInfoElement { .. } => "queryInfoElement",
            Self::SaveSubmittedRequest { .. } => "saveSubmittedRequest",
            Self::QuerySubmittedRequest { .. } => "querySubmittedRequest",
        }
    }

    /// Returns `true` if the operation never writes.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::QueryPerson { .. }
                | Self::QueryInfoElement { .. }
                | Self::QuerySubmittedRequest { .. }
        )
    }
}

fn unknown(name: &str) -> RegistryError {
    RegistryError::UnknownOperation { name: name.to_owned() }
}

/// The entity store and submission log behind one dispatcher.
///
/// # Example
///
/// ```
/// use kyc_registry::Registry;
/// use kyc_storage::MemoryBackend;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), kyc_registry::RegistryError> {
/// let registry = Registry::new(MemoryBackend::new());
///
/// registry.invoke("createPerson", &["alice"]).await?;
/// let person = registry.query("queryPerson", &["alice"]).await?;
/// assert_eq!(person.as_ref(), br#"{"id":"alice","infoElements":[]}"#);
///
/// let err = registry.query("deletePerson", &["alice"]).await.unwrap_err();
/// assert_eq!(
///     err.to_payload(),
///     r#"{"Error":"Received unknown function invocation: deletePerson"}"#
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Registry<B> {
    entities: EntityStore<B>,
    submissions: SubmissionLog<B>,
}

impl<B> std::fmt::Debug for Registry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entities)
            .field("submissions", &self.submissions)
            .finish()
    }
}

impl<B: StorageBackend + Clone> Registry<B> {
    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            entities: EntityStore::new(backend.clone()),
            submissions: SubmissionLog::new(backend),
        }
    }

    /// Creates a registry with `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation.
    pub fn with_config(backend: B, config: RegistryConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            entities: EntityStore::new(backend.clone()),
            submissions: SubmissionLog::with_config(backend, config)?,
        })
    }
}

impl<B: StorageBackend> Registry<B> {
    /// Returns the entity store.
    #[must_use]
    pub fn entities(&self) -> &EntityStore<B> {
        &self.entities
    }

    /// Returns the submission log.
    #[must_use]
    pub fn submissions(&self) -> &SubmissionLog<B> {
        &self.submissions
    }

    /// Runs a parsed operation.
    ///
    /// Read-only operations return the encoded record; the others return
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying store or log operation returns.
    #[tracing::instrument(skip(self, operation), fields(operation = operation.name()))]
    pub async fn execute(&self, operation: Operation) -> RegistryResult<Option<Bytes>> {
        let output = match operation {
            Operation::Init => {
                self.submissions.initialize().await?;
                None
            },
            Operation::CreatePerson { person_id } => {
                self.entities.create_person(&person_id).await?;
                None
            },
            Operation::UpdatePerson { payload } => {
                self.entities.put_person(payload.as_bytes()).await?;
                None
            },
            Operation::QueryPerson { person_id } => {
                Some(self.entities.query_person(&person_id).await?)
            },
            Operation::DeletePerson { person_id } => {
                self.entities.delete_person(&person_id).await?;
                None
            },
            Operation::UpdateInfoElement { person_id, payload } => {
                self.entities.update_info_element(&person_id, payload.as_bytes()).await?;
                None
            },
            Operation::DeleteInfoElement { person_id, element_id } => {
                self.entities.delete_info_element(&person_id, &element_id).await?;
                None
            },
            Operation::QueryInfoElement { person_id, element_id } => {
                Some(self.entities.query_info_element(&person_id, &element_id).await?)
            },
            Operation::SaveSubmittedRequest { request_id, person_id } => {
                self.submissions.save_submitted_request(&request_id, &person_id).await?;
                None
            },
            Operation::QuerySubmittedRequest { request_id } => {
                Some(self.submissions.query_submitted_request(&request_id).await?)
            },
        };
        Ok(output)
    }

    /// Parses and runs any operation.
    ///
    /// # Errors
    ///
    /// Returns a parse error from [`Operation::parse`] before anything runs,
    /// otherwise whatever [`execute`](Self::execute) returns.
    pub async fn invoke<S: AsRef<str>>(
        &self,
        function: &str,
        args: &[S],
    ) -> RegistryResult<Option<Bytes>> {
        let operation = Operation::parse(function, args)?;
        self.execute(operation).await
    }

    /// Parses and runs a read-only operation, returning its encoded record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOperation`] for operations that write,
    /// otherwise as [`invoke`](Self::invoke).
    pub async fn query<S: AsRef<str>>(&self, function: &str, args: &[S]) -> RegistryResult<Bytes> {
        let operation = Operation::parse(function, args)?;
        if !operation.is_read_only() {
            debug!(function, "mutating operation rejected on query entry point");
            return Err(unknown(function));
        }
        Ok(self.execute(operation).await?.unwrap_or_default())
    }

    /// Checks that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Backend`] if the backend reports unhealthy.
    pub async fn health_check(&self) -> RegistryResult<()> {
        self.entities.backend().health_check().await?;
        Ok(())
    }
}
