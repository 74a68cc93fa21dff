//! End-to-end behaviour of the table stores over an in-memory backend with
//! injected faults.

mod common;

use common::{Harness, Op, access_token, refresh_token, web_client};
use idtable_auth::{
    ClientStore, Consent, ConsentStore, ReferenceKind, StoreError, TransientDataStore,
};
use idtable_auth_table::{
    ArtifactKind, FanOutConfig, TableAuthStorage, TableStoreConfig, partition_key,
};
use idtable_storage::{FixedConnector, TableBackend, TableRow};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

// =============================================================================
// Token stores
// =============================================================================

#[tokio::test]
async fn test_token_handle_store_get_remove() {
    let h = Harness::new().await;
    let handles = h.storage.token_handles();
    let token = access_token("alice", "web");

    assert_ok!(handles.store("h-1", &token).await);

    let loaded = assert_ok!(handles.get("h-1").await).expect("stored handle");
    let expected = idtable_auth::Token {
        client: web_client(),
        ..token
    };
    assert_eq!(loaded, expected);

    assert_ok!(handles.remove("h-1").await);
    assert!(assert_ok!(handles.get("h-1").await).is_none());

    // Removing an absent key is not an error.
    assert_ok!(handles.remove("h-1").await);
    assert_ok!(handles.remove("never-stored").await);
}

#[tokio::test]
async fn test_token_rows_carry_index_columns() {
    let h = Harness::new().await;
    assert_ok!(
        h.storage
            .refresh_tokens()
            .store("rt-1", &refresh_token("alice", "web"))
            .await
    );

    let rows = h.backend.inner().rows("RefreshTokens").await;
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.partition_key, partition_key("rt-1"));
    assert_eq!(row.row_key, "rt-1");
    assert_eq!(row.property("SubjectId"), Some("alice"));
    assert_eq!(row.property("ClientId"), Some("web"));
    assert!(row.property("Json").is_some());
}

#[tokio::test]
async fn test_get_all_filters_by_subject() {
    let h = Harness::new().await;
    let store = h.storage.refresh_tokens();

    for i in 0..3 {
        assert_ok!(store.store(&format!("a-{i}"), &refresh_token("alice", "web")).await);
    }
    for i in 0..2 {
        assert_ok!(store.store(&format!("b-{i}"), &refresh_token("bob", "native")).await);
    }

    let alice = assert_ok!(store.get_all("alice").await);
    let bob = assert_ok!(store.get_all("bob").await);
    assert_eq!(alice.len(), 3);
    assert_eq!(bob.len(), 2);
    assert!(
        bob.iter()
            .all(|t| t.access_token.client.client_id == "native")
    );
    assert!(assert_ok!(store.get_all("carol").await).is_empty());
}

#[tokio::test]
async fn test_get_all_follows_continuation_tokens() {
    let h = Harness::with_config(TableStoreConfig::default(), 2).await;
    let store = h.storage.token_handles();

    for i in 0..7 {
        assert_ok!(store.store(&format!("h-{i}"), &access_token("alice", "web")).await);
    }

    let all = assert_ok!(store.get_all("alice").await);
    assert_eq!(all.len(), 7);
    assert!(h.backend.calls(Op::Query) >= 4);
}

#[tokio::test]
async fn test_revoke_matches_subject_and_client() {
    let h = Harness::new().await;
    let store = h.storage.refresh_tokens();

    assert_ok!(store.store("a-web-1", &refresh_token("alice", "web")).await);
    assert_ok!(store.store("a-web-2", &refresh_token("alice", "web")).await);
    assert_ok!(store.store("a-native", &refresh_token("alice", "native")).await);
    assert_ok!(store.store("b-web", &refresh_token("bob", "web")).await);

    assert_ok!(store.revoke("alice", "web").await);

    assert!(assert_ok!(store.get("a-web-1").await).is_none());
    assert!(assert_ok!(store.get("a-web-2").await).is_none());
    assert!(assert_ok!(store.get("a-native").await).is_some());
    assert!(assert_ok!(store.get("b-web").await).is_some());
}

#[tokio::test]
async fn test_failed_page_aborts_scan_without_partial_results() {
    let h = Harness::with_config(TableStoreConfig::default(), 2).await;
    let store = h.storage.refresh_tokens();

    for i in 0..5 {
        assert_ok!(store.store(&format!("rt-{i}"), &refresh_token("alice", "web")).await);
    }
    h.backend.fail_continued_pages(true);

    let err = assert_err!(store.get_all("alice").await);
    assert!(err.is_transient());

    let err = assert_err!(store.revoke("alice", "web").await);
    assert!(err.is_backend());
    assert_eq!(h.backend.calls(Op::Delete), 0);
    assert_eq!(h.backend.inner().row_count("RefreshTokens").await, 5);

    h.backend.fail_continued_pages(false);
    assert_eq!(assert_ok!(store.get_all("alice").await).len(), 5);
}

#[tokio::test]
async fn test_parallel_revoke_reports_failure_after_all_deletions() {
    let h = Harness::new().await;
    let store = h.storage.refresh_tokens();
    assert_eq!(store.fan_out(), FanOutConfig::parallel_awaited());

    for i in 0..3 {
        assert_ok!(store.store(&format!("rt-{i}"), &refresh_token("alice", "web")).await);
    }
    h.backend.fail_next(Op::Delete, 1);

    let err = assert_err!(store.revoke("alice", "web").await);
    assert!(err.is_transient());
    assert_eq!(h.backend.calls(Op::Delete), 3);
    assert_eq!(h.backend.inner().row_count("RefreshTokens").await, 1);
}

#[tokio::test]
async fn test_best_effort_revoke_from_config() {
    let mut config = TableStoreConfig::default();
    config.token_handles.revoke = FanOutConfig::sequential_best_effort();
    let h = Harness::with_config(config, 1000).await;
    let store = h.storage.token_handles();

    for i in 0..3 {
        assert_ok!(store.store(&format!("h-{i}"), &access_token("dave", "web")).await);
    }
    assert_ok!(store.revoke("dave", "web").await);

    for _ in 0..100 {
        if h.backend.inner().row_count("TokenHandle").await == 0 {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("background revocation did not finish");
}

// =============================================================================
// Reference resolution
// =============================================================================

#[tokio::test]
async fn test_deleted_client_fails_token_reads() {
    let h = Harness::new().await;
    let store = h.storage.token_handles();
    assert_ok!(store.store("h-native", &access_token("erin", "native")).await);

    assert_ok!(h.storage.clients().remove_client("native").await);

    let err = assert_err!(store.get("h-native").await);
    assert!(matches!(
        err,
        StoreError::ReferenceNotFound { kind: ReferenceKind::Client, ref id } if id == "native"
    ));

    let err = assert_err!(store.get_all("erin").await);
    assert!(err.is_reference_not_found());
}

#[tokio::test]
async fn test_missing_scope_fails_token_reads() {
    let h = Harness::new().await;
    let store = h.storage.refresh_tokens();
    assert_ok!(store.store("rt-1", &refresh_token("frank", "web")).await);

    h.scopes.remove("api").await;

    let err = assert_err!(store.get("rt-1").await);
    assert!(err.is_reference_not_found());
    assert!(err.is_data_integrity());
}

#[tokio::test]
async fn test_malformed_row_is_not_retried() {
    let h = Harness::new().await;
    let store = h.storage.token_handles();
    assert!(store.table().retry_policy().is_enabled());

    // Provision the table, then plant a corrupt row next to the real ones.
    assert!(assert_ok!(store.get("absent").await).is_none());
    let row = TableRow::new(partition_key("bad"), "bad")
        .with_property("Json", "{not json")
        .with_property("SubjectId", "alice")
        .with_property("ClientId", "web");
    assert_ok!(h.backend.inner().insert_or_replace("TokenHandle", row).await);
    h.backend.reset_calls();

    let err = assert_err!(store.get("bad").await);
    assert!(err.is_malformed_payload());
    assert_eq!(h.backend.calls_on(Op::Retrieve, "TokenHandle"), 1);
}

// =============================================================================
// Retry
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_token_handles_recover_from_transient_failures() {
    let h = Harness::new().await;
    let store = h.storage.token_handles();
    assert_ok!(store.store("h-1", &access_token("alice", "web")).await);
    h.backend.reset_calls();

    h.backend.fail_next(Op::Retrieve, 2);
    let loaded = assert_ok!(store.get("h-1").await);
    assert!(loaded.is_some());
    assert_eq!(h.backend.calls_on(Op::Retrieve, "TokenHandle"), 3);
    // Decoding resolves the client with one more read.
    assert_eq!(h.backend.calls_on(Op::Retrieve, "Clients"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_tokens_do_not_retry_by_default() {
    let h = Harness::new().await;
    let store = h.storage.refresh_tokens();
    assert_ok!(store.store("rt-1", &refresh_token("alice", "web")).await);
    h.backend.reset_calls();

    h.backend.fail_next(Op::Retrieve, 1);
    let err = assert_err!(store.get("rt-1").await);
    assert!(err.is_transient());
    assert_eq!(h.backend.calls_on(Op::Retrieve, "RefreshTokens"), 1);

    assert!(assert_ok!(store.get("rt-1").await).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_retry_gives_up_after_max_attempts() {
    let h = Harness::new().await;
    let store = h.storage.token_handles();
    assert_ok!(store.store("h-1", &access_token("alice", "web")).await);
    h.backend.reset_calls();

    h.backend.fail_next(Op::Upsert, 10);
    let err = assert_err!(store.store("h-2", &access_token("alice", "web")).await);
    assert!(err.is_transient());
    assert_eq!(h.backend.calls(Op::Upsert), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_provisioning_is_retried_on_next_use() {
    let mut config = TableStoreConfig::default();
    config.consents.retry = Some(false);
    let h = Harness::with_config(config, 1000).await;

    h.backend.fail_next(Op::CreateTable, 1);
    let err = assert_err!(h.storage.consents().load("alice", "web").await);
    assert!(err.is_transient());
    assert!(!h.storage.consents().table().is_initialized());

    assert!(assert_ok!(h.storage.consents().load("alice", "web").await).is_none());
    assert!(h.storage.consents().table().is_initialized());
}

// =============================================================================
// Consent
// =============================================================================

#[tokio::test]
async fn test_consent_round_trip_keeps_scope_order() {
    let h = Harness::new().await;
    let consents = h.storage.consents();
    let consent = Consent::new("alice", "web", ["profile", "openid", "api"]);

    assert_ok!(consents.update(&consent).await);
    let loaded = assert_ok!(consents.load("alice", "web").await);
    assert_eq!(loaded, Some(consent));

    let row = assert_ok!(
        h.backend
            .inner()
            .retrieve("Consent", "alice", "web")
            .await
    )
    .expect("consent row");
    assert_eq!(row.property("Scopes"), Some("profile,openid,api"));
}

#[tokio::test]
async fn test_consent_load_all_and_revoke() {
    let h = Harness::new().await;
    let consents = h.storage.consents();

    assert_ok!(consents.update(&Consent::new("alice", "web", ["openid"])).await);
    assert_ok!(consents.update(&Consent::new("alice", "native", ["api"])).await);
    assert_ok!(consents.update(&Consent::new("bob", "web", ["openid"])).await);

    let mut all = assert_ok!(consents.load_all("alice").await);
    all.sort_by(|a, b| a.client_id.cmp(&b.client_id));
    assert_eq!(
        all,
        vec![
            Consent::new("alice", "native", ["api"]),
            Consent::new("alice", "web", ["openid"]),
        ]
    );

    assert_ok!(consents.revoke("alice", "web").await);
    assert_ok!(consents.revoke("alice", "web").await);
    assert!(assert_ok!(consents.load("alice", "web").await).is_none());
    assert_eq!(assert_ok!(consents.load_all("alice").await).len(), 1);
    assert_eq!(assert_ok!(consents.load_all("bob").await).len(), 1);
}

#[tokio::test]
async fn test_consent_update_replaces_scopes() {
    let h = Harness::new().await;
    let consents = h.storage.consents();

    assert_ok!(consents.update(&Consent::new("alice", "web", ["openid", "api"])).await);
    assert_ok!(consents.update(&Consent::new("alice", "web", Vec::<String>::new())).await);

    let loaded = assert_ok!(consents.load("alice", "web").await).expect("consent");
    assert!(loaded.scopes.is_empty());
}

#[tokio::test]
async fn test_consent_rejects_scope_with_delimiter() {
    let h = Harness::new().await;
    let err = assert_err!(
        h.storage
            .consents()
            .update(&Consent::new("alice", "web", ["openid", "a,b"]))
            .await
    );
    assert!(matches!(err, StoreError::InvalidInput { .. }));
    assert!(!h.backend.inner().has_table("Consent"));
}

#[tokio::test]
async fn test_consent_rejects_empty_scope_name() {
    let h = Harness::new().await;
    let consents = h.storage.consents();
    assert_ok!(consents.update(&Consent::new("alice", "web", ["openid"])).await);

    let err = assert_err!(consents.update(&Consent::new("alice", "web", [""])).await);
    assert!(matches!(err, StoreError::InvalidInput { .. }));

    let loaded = assert_ok!(consents.load("alice", "web").await).expect("consent");
    assert_eq!(loaded.scopes, vec!["openid".to_string()]);
}

// =============================================================================
// Clients and provisioning
// =============================================================================

#[tokio::test]
async fn test_client_store_round_trip() {
    let h = Harness::new().await;
    let clients = h.storage.clients();

    let found = assert_ok!(clients.find_client_by_id("web").await);
    assert_eq!(found, Some(web_client()));

    assert_ok!(clients.remove_client("web").await);
    assert!(assert_ok!(clients.find_client_by_id("web").await).is_none());
    assert_ok!(clients.remove_client("web").await);
}

#[tokio::test]
async fn test_tables_are_provisioned_on_first_use() {
    let h = Harness::new().await;
    let inner = h.backend.inner();

    assert!(inner.has_table("Clients"));
    for kind in [
        ArtifactKind::Consents,
        ArtifactKind::RefreshTokens,
        ArtifactKind::TokenHandles,
    ] {
        assert!(!inner.has_table(kind.default_table_name()));
    }

    assert_ok!(h.storage.consents().load_all("alice").await);
    assert!(inner.has_table("Consent"));
    assert!(!inner.has_table("RefreshTokens"));

    assert_ok!(h.storage.consents().load_all("bob").await);
    assert_eq!(h.backend.calls(Op::CreateTable), 1);
}

#[tokio::test]
async fn test_table_name_overrides() {
    let mut config = TableStoreConfig::default();
    config.token_handles.table_name = Some("ReferenceTokens".to_string());
    let h = Harness::with_config(config, 1000).await;

    assert_ok!(
        h.storage
            .token_handles()
            .store("h-1", &access_token("alice", "web"))
            .await
    );
    assert!(h.backend.inner().has_table("ReferenceTokens"));
    assert!(!h.backend.inner().has_table("TokenHandle"));
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let backend = Arc::new(common::FlakyBackend::new(1000));
    let scopes = Arc::new(idtable_auth::InMemoryScopeStore::new(Vec::new()));

    let mut config = TableStoreConfig::default();
    config.consents.table_name = Some("Clients".to_string());

    let err = assert_err!(TableAuthStorage::new(
        &config,
        Arc::new(FixedConnector::new(backend.clone())),
        scopes,
    ));
    assert!(matches!(err, StoreError::Configuration { .. }));
    assert_eq!(backend.calls(Op::CreateTable), 0);
}
