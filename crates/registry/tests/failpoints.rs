#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Backend failures injected through `MemoryBackend` fail points.
//!
//! The registry's dev-dependency on `kyc-storage` enables the `failpoints`
//! feature, so these run as part of the normal test suite. Each test holds
//! a [`fail::FailScenario`], which serializes them.

use kyc_registry::{Person, RegistryError, assert_registry_error, testutil::memory_registry};
use kyc_storage::StorageError;

#[tokio::test]
async fn failed_person_write_surfaces_backend_error() {
    let scenario = fail::FailScenario::setup();
    let (registry, _) = memory_registry();
    registry.invoke("createPerson", &["alice"]).await.unwrap();

    fail::cfg("memory-set", "return").expect("failed to configure fail point");
    let result =
        registry.invoke("updateInfoElement", &["alice", r#"{"id":"doc1","hash":"abc"}"#]).await;
    fail::remove("memory-set");

    match result {
        Err(RegistryError::Backend(StorageError::Internal { .. })) => {},
        other => panic!("expected injected backend error, got {other:?}"),
    }
    let person: Person =
        serde_json::from_slice(&registry.query("queryPerson", &["alice"]).await.unwrap()).unwrap();
    assert!(person.info_elements.is_empty(), "failed write must not be applied");

    scenario.teardown();
}

#[tokio::test]
async fn failed_delete_surfaces_delete_failed() {
    let scenario = fail::FailScenario::setup();
    let (registry, backend) = memory_registry();
    registry.invoke("createPerson", &["alice"]).await.unwrap();

    fail::cfg("memory-delete", "return").expect("failed to configure fail point");
    assert_registry_error!(registry.invoke("deletePerson", &["alice"]).await, DeleteFailed);
    assert_eq!(backend.len(), 1);

    scenario.teardown();
}

#[tokio::test]
async fn failed_log_read_aborts_submission() {
    let scenario = fail::FailScenario::setup();
    let (registry, _) = memory_registry();
    registry.invoke::<&str>("init", &[]).await.unwrap();
    registry.invoke("createPerson", &["alice"]).await.unwrap();

    fail::cfg("memory-get", "return").expect("failed to configure fail point");
    let result = registry.invoke("saveSubmittedRequest", &["req1", "alice"]).await;
    fail::remove("memory-get");

    assert_registry_error!(result, Backend);
    assert!(registry.submissions().load().await.unwrap().is_empty());

    scenario.teardown();
}

#[tokio::test]
async fn second_write_failure_leaves_first_in_place() {
    let scenario = fail::FailScenario::setup();
    let (registry, _) = memory_registry();

    // first set passes, the next one fails
    fail::cfg("memory-set", "1*off->return").expect("failed to configure fail point");
    registry.invoke("createPerson", &["alice"]).await.unwrap();
    assert_registry_error!(registry.invoke("createPerson", &["bob"]).await, Backend);
    fail::remove("memory-set");

    assert!(registry.query("queryPerson", &["alice"]).await.is_ok());
    assert_registry_error!(registry.query("queryPerson", &["bob"]).await, NotFound);

    scenario.teardown();
}
