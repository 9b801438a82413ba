//! JSON encoding of stored records and payloads.
//!
//! Shared by [`EntityStore`](crate::EntityStore) and
//! [`SubmissionLog`](crate::SubmissionLog) so both read and write the same
//! wire format without depending on each other.

use bytes::Bytes;
use kyc_storage::StorageBackend;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{RegistryError, RegistryResult},
    records::Person,
};

/// Decodes `bytes` as `T`; `what` names the record in the error message.
pub(crate) fn decode<T: DeserializeOwned>(what: &str, bytes: &[u8]) -> RegistryResult<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| RegistryError::serialization(format!("failed to decode {what}"), e))
}

/// Encodes `value` as JSON bytes; `what` names the record in the error message.
pub(crate) fn encode<T: Serialize>(what: &str, value: &T) -> RegistryResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| RegistryError::serialization(format!("failed to encode {what}"), e))
}

/// Reads the raw bytes of the person stored at `person_id`.
pub(crate) async fn read_person_bytes<B: StorageBackend>(
    backend: &B,
    person_id: &str,
) -> RegistryResult<Bytes> {
    backend.get(person_id.as_bytes()).await?.ok_or_else(|| RegistryError::not_found(person_id))
}

/// Reads and decodes the person stored at `person_id`.
pub(crate) async fn read_person<B: StorageBackend>(
    backend: &B,
    person_id: &str,
) -> RegistryResult<Person> {
    let bytes = read_person_bytes(backend, person_id).await?;
    decode("person", &bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use kyc_storage::{MemoryBackend, testutil::seeded_backend};

    use super::*;

    #[test]
    fn decode_error_names_the_record() {
        let err = decode::<Person>("person", b"{not json").unwrap_err();
        assert!(matches!(err, RegistryError::Serialization { .. }));
        assert_eq!(err.to_string(), "Serialization error: failed to decode person");
    }

    #[test]
    fn encode_person_is_compact_camel_case() {
        let bytes = encode("person", &Person::new("alice")).unwrap();
        assert_eq!(bytes, br#"{"id":"alice","infoElements":[]}"#);
    }

    #[tokio::test]
    async fn read_person_missing_is_not_found() {
        let backend = MemoryBackend::new();
        let err = read_person(&backend, "ghost").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { ref key } if key == "ghost"));
    }

    #[tokio::test]
    async fn read_person_decodes_stored_record() {
        let backend = seeded_backend([("alice", r#"{"id":"alice"}"#)]).await;
        let person = read_person(&backend, "alice").await.unwrap();
        assert_eq!(person, Person::new("alice"));
    }
}
