//! The append-only log of submitted requests.
//!
//! The whole log is one JSON array stored at a single well-known key
//! ([`RegistryConfig::submissions_key`]). Every submission reads the array,
//! appends a snapshot and writes the array back, so two concurrent
//! submissions can lose one of the entries. The log must be initialized
//! before the first submission.

use bytes::Bytes;
use kyc_storage::{StorageBackend, StorageError};
use tracing::{debug, warn};

use crate::{
    codec::{decode, encode, read_person},
    config::{ConfigError, RegistryConfig},
    error::{RegistryError, RegistryResult},
    records::{SubmissionRecord, SubmittedRequest},
};

/// Reads and appends [`SubmittedRequest`]s.
///
/// # Example
///
/// ```
/// use kyc_registry::{EntityStore, SubmissionLog};
/// use kyc_storage::MemoryBackend;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), kyc_registry::RegistryError> {
/// let backend = MemoryBackend::new();
/// let log = SubmissionLog::new(backend.clone());
/// let people = EntityStore::new(backend);
///
/// log.initialize().await?;
/// people.create_person("alice").await?;
/// log.save_submitted_request("req1", "alice").await?;
///
/// assert_eq!(log.load().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SubmissionLog<B> {
    backend: B,
    config: RegistryConfig,
}

impl<B> std::fmt::Debug for SubmissionLog<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionLog").field("config", &self.config).finish_non_exhaustive()
    }
}

impl<B: StorageBackend> SubmissionLog<B> {
    /// Creates a log over `backend` with the default configuration.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend, config: RegistryConfig::default() }
    }

    /// Creates a log over `backend` with `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation.
    pub fn with_config(backend: B, config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Writes an empty log.
    ///
    /// This is destructive: calling it on an existing log discards every
    /// submission in it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Backend`] if the read or write fails.
    #[tracing::instrument(skip(self), fields(key = %self.config.submissions_key))]
    pub async fn initialize(&self) -> RegistryResult<()> {
        if let Some(existing) = self.backend.get(self.key()).await? {
            match decode::<SubmissionRecord>("submission log", &existing) {
                Ok(log) if !log.is_empty() => {
                    warn!(discarded = log.len(), "re-initializing submission log");
                },
                Ok(_) => {},
                Err(e) => warn!(error = %e, "replacing unreadable submission log"),
            }
        }

        self.store(&SubmissionRecord::new()).await?;
        debug!("submission log initialized");
        Ok(())
    }

    /// Appends a snapshot of the person at `person_id` under `request_id`.
    ///
    /// The snapshot is a full copy; later changes to the person, including
    /// its deletion, do not affect it.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidArgument`] if `request_id` is empty.
    /// - [`RegistryError::Backend`] wrapping [`StorageError::NotFound`] if the
    ///   log was never initialized.
    /// - [`RegistryError::DuplicateSubmission`] if `request_id` is already
    ///   in the log; the log is not modified.
    /// - [`RegistryError::NotFound`] if the person does not exist.
    /// - [`RegistryError::Serialization`] if a stored record is malformed.
    /// - [`RegistryError::Backend`] if a read or write fails.
    #[tracing::instrument(skip(self))]
    pub async fn save_submitted_request(
        &self,
        request_id: &str,
        person_id: &str,
    ) -> RegistryResult<()> {
        if request_id.is_empty() {
            return Err(RegistryError::invalid_argument("request_id", "must not be empty"));
        }

        let mut log = self.load().await?;
        if log.contains(request_id) {
            warn!("duplicate submission rejected");
            return Err(RegistryError::duplicate_submission(request_id));
        }

        let person = read_person(&self.backend, person_id).await?;
        log.append(SubmittedRequest {
            id: request_id.to_owned(),
            version: self.config.submission_version.clone(),
            submitted_on: self.config.submitted_on_placeholder.clone(),
            person,
        })?;
        self.store(&log).await?;

        debug!(entries = log.len(), "submission appended");
        Ok(())
    }

    /// Returns one submission, encoded on its own.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Backend`] wrapping [`StorageError::NotFound`] if the
    ///   log was never initialized.
    /// - [`RegistryError::RequestNotFound`] if no submission has this id.
    /// - [`RegistryError::Serialization`] if the stored log is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn query_submitted_request(&self, request_id: &str) -> RegistryResult<Bytes> {
        let log = self.load().await?;
        let request =
            log.find(request_id).ok_or_else(|| RegistryError::request_not_found(request_id))?;

        Ok(Bytes::from(encode("submitted request", request)?))
    }

    /// Reads and decodes the whole log.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Backend`] wrapping [`StorageError::NotFound`] if the
    ///   log was never initialized.
    /// - [`RegistryError::Serialization`] if the stored log is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> RegistryResult<SubmissionRecord> {
        let bytes = self
            .backend
            .get(self.key())
            .await?
            .ok_or_else(|| StorageError::not_found(self.config.submissions_key.as_str()))?;
        decode("submission log", &bytes)
    }

    fn key(&self) -> &[u8] {
        self.config.submissions_key.as_bytes()
    }

    async fn store(&self, log: &SubmissionRecord) -> RegistryResult<()> {
        let bytes = encode("submission log", log)?;
        self.backend.set(self.key().to_vec(), bytes).await?;
        Ok(())
    }
}
