//! Person records and their info elements.
//!
//! Each person is stored whole, as one JSON value at the key equal to its
//! id. Element-level changes read that value, apply a pure transformation
//! from [`Person`] and write the whole value back.
//!
//! # Concurrency
//!
//! There is no version check between the read and the write of an
//! operation. Two concurrent element updates against the same person can
//! both read the same state, and the later write silently discards the
//! earlier one. Callers that need stronger guarantees must serialize
//! mutations per person themselves.

use bytes::Bytes;
use kyc_storage::StorageBackend;
use tracing::debug;

use crate::{
    codec::{decode, encode, read_person, read_person_bytes},
    error::{RegistryError, RegistryResult},
    records::{InfoElement, Person, Upsert},
};

/// Stores person aggregates in a [`StorageBackend`].
///
/// # Example
///
/// ```
/// use kyc_registry::EntityStore;
/// use kyc_storage::MemoryBackend;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), kyc_registry::RegistryError> {
/// let store = EntityStore::new(MemoryBackend::new());
///
/// store.create_person("alice").await?;
/// store.update_info_element("alice", br#"{"id":"doc1","hash":"abc"}"#).await?;
///
/// let element = store.query_info_element("alice", "doc1").await?;
/// assert!(element.starts_with(br#"{"id":"doc1""#));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EntityStore<B> {
    backend: B,
}

impl<B> std::fmt::Debug for EntityStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore").finish_non_exhaustive()
    }
}

impl<B: StorageBackend> EntityStore<B> {
    /// Creates a store over `backend`.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Writes an empty person at `person_id`.
    ///
    /// An existing record at that key is overwritten, which clears its
    /// elements.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidArgument`] if `person_id` is empty.
    /// - [`RegistryError::Backend`] if the write fails.
    #[tracing::instrument(skip(self))]
    pub async fn create_person(&self, person_id: &str) -> RegistryResult<()> {
        if person_id.is_empty() {
            return Err(RegistryError::invalid_argument("person_id", "must not be empty"));
        }

        let bytes = encode("person", &Person::new(person_id))?;
        self.backend.set(person_id.as_bytes().to_vec(), bytes).await?;
        debug!("person created");
        Ok(())
    }

    /// Stores a whole person supplied as JSON at the person's own id.
    ///
    /// The payload is decoded and validated, then stored exactly as given.
    /// Returns the person id.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Serialization`] if the payload is not a person.
    /// - [`RegistryError::InvalidArgument`] if its id is empty.
    /// - [`RegistryError::InvalidRecord`] if two of its elements share an id.
    /// - [`RegistryError::Backend`] if the write fails.
    #[tracing::instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn put_person(&self, payload: &[u8]) -> RegistryResult<String> {
        let person: Person = decode("person payload", payload)?;
        person.validate()?;

        self.backend.set(person.id.as_bytes().to_vec(), payload.to_vec()).await?;
        debug!(person_id = %person.id, elements = person.info_elements.len(), "person stored");
        Ok(person.id)
    }

    /// Returns the stored bytes of the person, unchanged.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if no person is stored at `person_id`.
    /// - [`RegistryError::Backend`] if the read fails.
    #[tracing::instrument(skip(self))]
    pub async fn query_person(&self, person_id: &str) -> RegistryResult<Bytes> {
        read_person_bytes(&self.backend, person_id).await
    }

    /// Reads and decodes the person.
    ///
    /// # Errors
    ///
    /// As [`query_person`](Self::query_person), plus
    /// [`RegistryError::Serialization`] if the stored record is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn load_person(&self, person_id: &str) -> RegistryResult<Person> {
        read_person(&self.backend, person_id).await
    }

    /// Inserts an element, or replaces the element with the same id in place.
    ///
    /// The person is read before the payload is decoded, so a missing person
    /// is reported even when the payload is malformed.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if the person does not exist.
    /// - [`RegistryError::Serialization`] if the payload is not an element or
    ///   the stored person is malformed.
    /// - [`RegistryError::Backend`] if the read or write fails.
    #[tracing::instrument(skip(self, element_payload), fields(payload_len = element_payload.len()))]
    pub async fn update_info_element(
        &self,
        person_id: &str,
        element_payload: &[u8],
    ) -> RegistryResult<Upsert> {
        let mut person = read_person(&self.backend, person_id).await?;
        let element: InfoElement = decode("info element payload", element_payload)?;
        let element_id = element.id.to_string();

        let outcome = person.upsert_element(element);
        self.write(person_id, &person).await?;

        match outcome {
            Upsert::Replaced { index } => debug!(%element_id, index, "info element replaced"),
            Upsert::Appended { index } => debug!(%element_id, index, "info element appended"),
        }
        Ok(outcome)
    }

    /// Removes every element with `element_id`, keeping the order of the rest.
    ///
    /// Returns the number of elements removed. Nothing is written when no
    /// element matched, so the stored bytes stay exactly as they were.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if the person does not exist.
    /// - [`RegistryError::Serialization`] if the stored person is malformed.
    /// - [`RegistryError::Backend`] if the read or write fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete_info_element(
        &self,
        person_id: &str,
        element_id: &str,
    ) -> RegistryResult<usize> {
        let mut person = read_person(&self.backend, person_id).await?;
        if person.info_elements.is_empty() {
            debug!("person has no info elements, nothing to delete");
            return Ok(0);
        }

        let removed = person.remove_element(element_id);
        if removed == 0 {
            debug!("no matching info element, nothing to delete");
            return Ok(0);
        }
        self.write(person_id, &person).await?;

        debug!(removed, "info element delete applied");
        Ok(removed)
    }

    /// Returns one element, encoded on its own.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if the person does not exist.
    /// - [`RegistryError::ElementNotFound`] if the person has no such element.
    /// - [`RegistryError::Serialization`] if the stored person is malformed.
    /// - [`RegistryError::Backend`] if the read fails.
    #[tracing::instrument(skip(self))]
    pub async fn query_info_element(
        &self,
        person_id: &str,
        element_id: &str,
    ) -> RegistryResult<Bytes> {
        let person = read_person(&self.backend, person_id).await?;
        let element = person
            .element(element_id)
            .ok_or_else(|| RegistryError::element_not_found(person_id, element_id))?;

        Ok(Bytes::from(encode("info element", element)?))
    }

    /// Deletes the person record. Deleting a missing person succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DeleteFailed`] if the backend delete fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete_person(&self, person_id: &str) -> RegistryResult<()> {
        self.backend
            .delete(person_id.as_bytes())
            .await
            .map_err(|source| RegistryError::DeleteFailed { key: person_id.to_owned(), source })?;
        debug!("person deleted");
        Ok(())
    }

    /// Writes `person` back to the key it was read from, whatever its `id` says.
    async fn write(&self, person_id: &str, person: &Person) -> RegistryResult<()> {
        let bytes = encode("person", person)?;
        self.backend.set(person_id.as_bytes().to_vec(), bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use kyc_storage::MemoryBackend;

    use super::*;

    #[tokio::test]
    async fn create_rejects_empty_id() {
        let store = EntityStore::new(MemoryBackend::new());
        let err = store.create_person("").await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument { name: "person_id", .. }));
        assert!(store.backend().is_empty());
    }

    #[tokio::test]
    async fn update_checks_person_before_payload() {
        let store = EntityStore::new(MemoryBackend::new());
        let err = store.update_info_element("ghost", b"not json").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn malformed_element_payload_leaves_person_unchanged() {
        let store = EntityStore::new(MemoryBackend::new());
        store.create_person("alice").await.unwrap();
        let before = store.query_person("alice").await.unwrap();

        let err = store.update_info_element("alice", br#"{"hash":"no id"}"#).await.unwrap_err();
        assert!(matches!(err, RegistryError::Serialization { .. }));
        assert_eq!(store.query_person("alice").await.unwrap(), before);
    }

    #[tokio::test]
    async fn put_person_stores_payload_bytes_verbatim() {
        let store = EntityStore::new(MemoryBackend::new());
        let payload = br#"{ "id": "bob", "infoElements": [ {"id": 1, "title": "passport"} ] }"#;

        assert_eq!(store.put_person(payload).await.unwrap(), "bob");
        assert_eq!(store.query_person("bob").await.unwrap().as_ref(), payload);
        assert_eq!(store.load_person("bob").await.unwrap().info_elements.len(), 1);
    }

    #[tokio::test]
    async fn put_person_rejects_duplicate_elements() {
        let store = EntityStore::new(MemoryBackend::new());
        let payload = br#"{"id":"bob","infoElements":[{"id":"d"},{"id":"d"}]}"#;

        let err = store.put_person(payload).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRecord { .. }));
        assert!(store.backend().is_empty());
    }

    #[tokio::test]
    async fn put_person_rejects_empty_id() {
        let store = EntityStore::new(MemoryBackend::new());
        let err = store.put_person(br#"{"id":""}"#).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn query_element_by_text_finds_numeric_id() {
        let store = EntityStore::new(MemoryBackend::new());
        store.create_person("alice").await.unwrap();
        store.update_info_element("alice", br#"{"id":42,"status":"verified"}"#).await.unwrap();

        let element: InfoElement =
            serde_json::from_slice(&store.query_info_element("alice", "42").await.unwrap())
                .unwrap();
        assert_eq!(element.status, "verified");
    }
}
