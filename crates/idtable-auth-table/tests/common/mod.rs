//! Shared fixtures: a fault-injecting backend over the in-memory table service
//! and a fully wired `TableAuthStorage`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use idtable_auth::{Claim, ClaimsPrincipal, Client, InMemoryScopeStore, RefreshToken, Scope, Token};
use idtable_auth_table::{TableAuthStorage, TableStoreConfig};
use idtable_db_memory::{InMemoryOptions, InMemoryTableStorage};
use idtable_storage::{
    ContinuationToken, ETag, FixedConnector, QueryPage, StorageError, TableBackend, TableQuery,
    TableRow,
};

/// Backend operations that can be counted and failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CreateTable,
    Retrieve,
    Upsert,
    Delete,
    Query,
}

/// Wraps an in-memory backend, counting calls and injecting transient
/// failures on demand.
pub struct FlakyBackend {
    inner: InMemoryTableStorage,
    calls: Mutex<HashMap<(Op, String), u32>>,
    pending_failures: Mutex<HashMap<Op, u32>>,
    fail_continuations: AtomicBool,
}

impl FlakyBackend {
    pub fn new(max_page_size: usize) -> Self {
        Self {
            inner: InMemoryTableStorage::with_options(InMemoryOptions { max_page_size }),
            calls: Mutex::new(HashMap::new()),
            pending_failures: Mutex::new(HashMap::new()),
            fail_continuations: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &InMemoryTableStorage {
        &self.inner
    }

    /// Makes the next `count` calls of `op` fail with `Unavailable`.
    pub fn fail_next(&self, op: Op, count: u32) {
        self.pending_failures.lock().unwrap().insert(op, count);
    }

    /// Makes every page fetch that resumes from a continuation token fail,
    /// i.e. every page after the first.
    pub fn fail_continued_pages(&self, enabled: bool) {
        self.fail_continuations.store(enabled, Ordering::SeqCst);
    }

    /// Calls of `op` across every table.
    pub fn calls(&self, op: Op) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|((recorded, _), _)| *recorded == op)
            .map(|(_, count)| count)
            .sum()
    }

    /// Calls of `op` against one table.
    pub fn calls_on(&self, op: Op, table: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(&(op, table.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn enter(&self, op: Op, table: &str) -> Result<(), StorageError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry((op, table.to_string()))
            .or_insert(0) += 1;

        let mut pending = self.pending_failures.lock().unwrap();
        match pending.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(StorageError::unavailable(format!("injected {op:?} failure")))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl TableBackend for FlakyBackend {
    async fn create_table_if_not_exists(&self, table: &str) -> Result<bool, StorageError> {
        self.enter(Op::CreateTable, table)?;
        self.inner.create_table_if_not_exists(table).await
    }

    async fn retrieve(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableRow>, StorageError> {
        self.enter(Op::Retrieve, table)?;
        self.inner.retrieve(table, partition_key, row_key).await
    }

    async fn insert_or_replace(
        &self,
        table: &str,
        row: TableRow,
    ) -> Result<TableRow, StorageError> {
        self.enter(Op::Upsert, table)?;
        self.inner.insert_or_replace(table, row).await
    }

    async fn delete(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
        etag: &ETag,
    ) -> Result<(), StorageError> {
        self.enter(Op::Delete, table)?;
        self.inner.delete(table, partition_key, row_key, etag).await
    }

    async fn execute_query_segmented(
        &self,
        table: &str,
        query: &TableQuery,
        continuation: Option<&ContinuationToken>,
    ) -> Result<QueryPage, StorageError> {
        self.enter(Op::Query, table)?;
        if continuation.is_some() && self.fail_continuations.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("injected page failure"));
        }
        self.inner
            .execute_query_segmented(table, query, continuation)
            .await
    }

    fn backend_name(&self) -> &'static str {
        "flaky-in-memory"
    }
}

/// A storage instance over a [`FlakyBackend`].
pub struct Harness {
    pub backend: Arc<FlakyBackend>,
    pub scopes: Arc<InMemoryScopeStore>,
    pub storage: TableAuthStorage,
}

impl Harness {
    /// Default configuration, 1000-row pages.
    pub async fn new() -> Self {
        Self::with_config(TableStoreConfig::default(), 1000).await
    }

    /// Builds storage and registers the `web` and `native` clients.
    pub async fn with_config(config: TableStoreConfig, max_page_size: usize) -> Self {
        init_tracing();

        let backend = Arc::new(FlakyBackend::new(max_page_size));
        let scopes = Arc::new(InMemoryScopeStore::new([
            Scope::identity("openid"),
            Scope::resource("api"),
        ]));
        let storage = TableAuthStorage::new(
            &config,
            Arc::new(FixedConnector::new(backend.clone())),
            scopes.clone(),
        )
        .expect("valid config");

        for client in [web_client(), Client::new("native", "Native App")] {
            storage
                .clients()
                .store_client(&client)
                .await
                .expect("store client");
        }
        backend.reset_calls();

        Self {
            backend,
            scopes,
            storage,
        }
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn web_client() -> Client {
    Client::new("web", "Web App").with_allowed_scopes(["openid", "api"])
}

/// An access token for `subject` issued to `client_id`.
pub fn access_token(subject: &str, client_id: &str) -> Token {
    Token::new(
        Client::new(client_id, client_id),
        vec![Claim::new("sub", subject), Claim::new("scope", "api")],
        vec![Scope::identity("openid"), Scope::resource("api")],
        3600,
    )
}

/// A refresh token for `subject` issued to `client_id`.
pub fn refresh_token(subject: &str, client_id: &str) -> RefreshToken {
    let principal = ClaimsPrincipal::from_claims(vec![Claim::new("sub", subject)], "idsrv");
    RefreshToken::new(access_token(subject, client_id), principal, 86400)
}
