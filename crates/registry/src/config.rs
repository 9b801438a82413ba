//! Configuration for the registry.
//!
//! [`RegistryConfig`] fixes where the submission log lives and what every
//! new [`SubmittedRequest`](crate::SubmittedRequest) is stamped with.

pub use kyc_storage::ConfigError;
use serde::{Deserialize, Serialize};

/// Default ledger key of the submission log.
pub const DEFAULT_SUBMISSIONS_KEY: &str = "SUBMITTED_REQUESTS_ID";

/// Default version tag of new submissions.
pub const DEFAULT_SUBMISSION_VERSION: &str = "1.0";

/// Default `submittedOn` marker of new submissions.
pub const DEFAULT_SUBMITTED_ON: &str = "unknown";

/// Configuration for [`Registry`](crate::Registry) and [`SubmissionLog`](crate::SubmissionLog).
///
/// # Example
///
/// ```
/// use kyc_registry::RegistryConfig;
///
/// let config = RegistryConfig::builder().submission_version("2.0").build()?;
/// assert_eq!(config.submissions_key(), "SUBMITTED_REQUESTS_ID");
/// assert_eq!(config.submission_version(), "2.0");
/// # Ok::<(), kyc_registry::ConfigError>(())
/// ```
///
/// Deserialized configurations are not validated; call
/// [`validate`](Self::validate) before use. [`Registry::with_config`](crate::Registry::with_config)
/// and [`SubmissionLog::with_config`](crate::SubmissionLog::with_config) do so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Ledger key holding the submission log.
    #[serde(default = "default_submissions_key")]
    pub(crate) submissions_key: String,

    /// Version tag written into every new submission.
    #[serde(default = "default_submission_version")]
    pub(crate) submission_version: String,

    /// Value written into `submittedOn`.
    #[serde(default = "default_submitted_on")]
    pub(crate) submitted_on_placeholder: String,
}

fn default_submissions_key() -> String {
    DEFAULT_SUBMISSIONS_KEY.to_owned()
}

fn default_submission_version() -> String {
    DEFAULT_SUBMISSION_VERSION.to_owned()
}

fn default_submitted_on() -> String {
    DEFAULT_SUBMITTED_ON.to_owned()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            submissions_key: default_submissions_key(),
            submission_version: default_submission_version(),
            submitted_on_placeholder: default_submitted_on(),
        }
    }
}

#[bon::bon]
impl RegistryConfig {
    /// Creates a new configuration, validating all fields.
    ///
    /// # Optional Fields
    ///
    /// * `submissions_key` - Ledger key of the log (default: `SUBMITTED_REQUESTS_ID`).
    /// * `submission_version` - Version tag of new submissions (default: `1.0`).
    /// * `submitted_on_placeholder` - `submittedOn` marker (default: `unknown`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if `submissions_key` or
    /// `submission_version` is empty.
    #[builder]
    pub fn new(
        #[builder(into, default = default_submissions_key())] submissions_key: String,
        #[builder(into, default = default_submission_version())] submission_version: String,
        #[builder(into, default = default_submitted_on())] submitted_on_placeholder: String,
    ) -> Result<Self, ConfigError> {
        let config = Self { submissions_key, submission_version, submitted_on_placeholder };
        config.validate()?;
        Ok(config)
    }

    /// Checks the field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] naming the first empty required field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.submissions_key.is_empty() {
            return Err(ConfigError::Empty { field: "submissions_key" });
        }
        if self.submission_version.is_empty() {
            return Err(ConfigError::Empty { field: "submission_version" });
        }
        Ok(())
    }

    /// Returns the ledger key of the submission log.
    #[must_use]
    pub fn submissions_key(&self) -> &str {
        &self.submissions_key
    }

    /// Returns the version tag of new submissions.
    #[must_use]
    pub fn submission_version(&self) -> &str {
        &self.submission_version
    }

    /// Returns the `submittedOn` marker of new submissions.
    #[must_use]
    pub fn submitted_on_placeholder(&self) -> &str {
        &self.submitted_on_placeholder
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default_impl() {
        assert_eq!(RegistryConfig::builder().build().unwrap(), RegistryConfig::default());
    }

    #[test]
    fn test_custom_values() {
        let config = RegistryConfig::builder()
            .submissions_key("LOG")
            .submission_version("2.0")
            .submitted_on_placeholder("")
            .build()
            .unwrap();

        assert_eq!(config.submissions_key(), "LOG");
        assert_eq!(config.submission_version(), "2.0");
        assert_eq!(config.submitted_on_placeholder(), "");
    }

    #[test]
    fn test_validation_empty_submissions_key() {
        let err = RegistryConfig::builder().submissions_key("").build().unwrap_err();
        assert_eq!(err, ConfigError::Empty { field: "submissions_key" });
    }

    #[test]
    fn test_validation_empty_version() {
        let err = RegistryConfig::builder().submission_version("").build().unwrap_err();
        assert_eq!(err, ConfigError::Empty { field: "submission_version" });
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: RegistryConfig = serde_json::from_str(r#"{"submission_version":"3"}"#).unwrap();
        assert_eq!(config.submissions_key(), DEFAULT_SUBMISSIONS_KEY);
        assert_eq!(config.submission_version(), "3");
        assert_eq!(config.submitted_on_placeholder(), DEFAULT_SUBMITTED_ON);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        assert!(serde_json::from_str::<RegistryConfig>(r#"{"vault":1}"#).is_err());
    }

    #[test]
    fn test_deserialized_config_can_be_invalid_until_validated() {
        let config: RegistryConfig = serde_json::from_str(r#"{"submissions_key":""}"#).unwrap();
        assert!(config.validate().is_err());
    }
}
