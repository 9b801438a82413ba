//! Test helpers for code built on the registry.
//!
//! Feature-gated behind `testutil`:
//!
//! ```toml
//! [dev-dependencies]
//! kyc-registry = { path = "../registry", features = ["testutil"] }
//! ```

use kyc_storage::{MemoryBackend, StorageBackend, testutil::FailingBackend};

use crate::{
    dispatch::Registry,
    records::{InfoElement, Person},
};

/// An element with the given id and hash and every other field empty.
#[must_use]
pub fn element(id: &str, hash: &str) -> InfoElement {
    InfoElement::builder().id(id).hash(hash).build()
}

/// The JSON payload of [`element`].
///
/// # Panics
///
/// Panics if encoding fails (it cannot for [`InfoElement`]).
#[must_use]
pub fn element_json(id: &str, hash: &str) -> String {
    serde_json::to_string(&element(id, hash)).expect("encode info element")
}

/// A person holding elements with the given ids, in order.
#[must_use]
pub fn person_with(id: &str, element_ids: &[&str]) -> Person {
    Person {
        id: id.to_owned(),
        info_elements: element_ids.iter().map(|element_id| element(element_id, "")).collect(),
    }
}

/// A registry over a fresh [`MemoryBackend`], with a handle to the backend.
#[must_use]
pub fn memory_registry() -> (Registry<MemoryBackend>, MemoryBackend) {
    let backend = MemoryBackend::new();
    (Registry::new(backend.clone()), backend)
}

/// A registry over a [`FailingBackend`] with no failures configured yet.
#[must_use]
pub fn failing_registry() -> (Registry<FailingBackend>, FailingBackend) {
    let backend = FailingBackend::new(MemoryBackend::new());
    (Registry::new(backend.clone()), backend)
}

/// Reads and decodes the person stored at `person_id` directly from `backend`.
///
/// # Panics
///
/// Panics if the person is missing or malformed.
pub async fn stored_person<B: StorageBackend>(backend: &B, person_id: &str) -> Person {
    let bytes = backend
        .get(person_id.as_bytes())
        .await
        .expect("backend get")
        .unwrap_or_else(|| panic!("person {person_id} not stored"));
    serde_json::from_slice(&bytes).expect("decode stored person")
}

/// Assert that a [`RegistryResult`](crate::RegistryResult) is an error of the
/// given [`RegistryError`](crate::RegistryError) variant.
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use kyc_registry::{RegistryError, RegistryResult, assert_registry_error};
///
/// let result: RegistryResult<()> = Err(RegistryError::not_found("alice"));
/// assert_registry_error!(result, NotFound);
/// ```
#[macro_export]
macro_rules! assert_registry_error {
    ($result:expr, $variant:ident) => {
        match $result {
            Err($crate::RegistryError::$variant { .. }) => {},
            other => panic!("expected RegistryError::{}, got: {:?}", stringify!($variant), other),
        }
    };
}
