//! Token tables: refresh tokens and reference token handles.
//!
//! Both kinds share one implementation. Each row holds the serialized token in
//! `Json` plus the `SubjectId` / `ClientId` index columns, which are derived
//! from the token on every write.
//!
//! # Revocation fan-out
//!
//! `revoke` first scans every matching row, then deletes them according to
//! the store's [`FanOutConfig`]:
//!
//! - `parallel` + `awaited` (default): all deletions in flight at once,
//!   returns after every one settled, reporting the first failure
//! - `sequential` + `awaited`: one after another, same reporting
//! - `best_effort`: deletions run in a detached task; failures are logged and
//!   `revoke` returns as soon as the scan succeeded

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{join_all, try_join_all};
use idtable_auth::{
    ArtifactSerializer, PersistedArtifact, RefreshToken, StoreResult, Token, TokenMetadata,
    TransientDataStore,
};
use idtable_storage::StorageError;
use tracing::instrument;

use crate::config::{FanOutCompletion, FanOutConfig, FanOutMode};
use crate::partition::partition_key;
use crate::rows::{TokenRow, by_subject, by_subject_and_client};
use crate::scan::PagedScanner;
use crate::table::LazyTable;

/// Table-backed store for a token artifact kind.
#[derive(Debug)]
pub struct TableTokenStore<T> {
    table: Arc<LazyTable>,
    serializer: ArtifactSerializer,
    fan_out: FanOutConfig,
    _artifact: PhantomData<fn() -> T>,
}

/// Refresh token store.
pub type TableRefreshTokenStore = TableTokenStore<RefreshToken>;

/// Reference token handle store.
pub type TableTokenHandleStore = TableTokenStore<Token>;

impl<T> TableTokenStore<T> {
    /// Creates a store over `table`, decoding through `serializer`.
    #[must_use]
    pub fn new(table: LazyTable, serializer: ArtifactSerializer) -> Self {
        Self {
            table: Arc::new(table),
            serializer,
            fan_out: FanOutConfig::default(),
            _artifact: PhantomData,
        }
    }

    /// Sets the revocation fan-out strategy.
    #[must_use]
    pub fn with_fan_out(mut self, fan_out: FanOutConfig) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &LazyTable {
        &self.table
    }

    /// The revocation fan-out strategy.
    #[must_use]
    pub fn fan_out(&self) -> FanOutConfig {
        self.fan_out
    }
}

/// Deletes `keys`, returning how many rows existed and the first failure.
///
/// Every deletion is attempted even after a failure.
async fn delete_rows(
    table: &LazyTable,
    keys: &[(String, String)],
    mode: FanOutMode,
) -> (usize, Option<StorageError>) {
    let results = match mode {
        FanOutMode::Parallel => {
            join_all(keys.iter().map(|(pk, rk)| table.delete(pk, rk))).await
        }
        FanOutMode::Sequential => {
            let mut results = Vec::with_capacity(keys.len());
            for (pk, rk) in keys {
                results.push(table.delete(pk, rk).await);
            }
            results
        }
    };

    let mut deleted = 0;
    let mut first_error = None;
    for result in results {
        match result {
            Ok(existed) => deleted += usize::from(existed),
            Err(err) => {
                tracing::warn!(table = table.name(), error = %err, "Token deletion failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }
    (deleted, first_error)
}

#[async_trait]
impl<T> TransientDataStore<T> for TableTokenStore<T>
where
    T: PersistedArtifact + TokenMetadata + Send + Sync + 'static,
{
    #[instrument(skip(self, value), fields(table = self.table.name()))]
    async fn store(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = self.serializer.to_json(value)?;
        let row = TokenRow::new(key, json, value).into_table_row();
        self.table.insert_or_replace(row).await?;
        tracing::debug!("Stored token");
        Ok(())
    }

    #[instrument(skip(self), fields(table = self.table.name()))]
    async fn get(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(row) = self.table.retrieve(&partition_key(key), key).await? else {
            return Ok(None);
        };
        let token_row = TokenRow::from_table_row(&row)?;
        let value = self.serializer.from_json(&token_row.json).await?;
        Ok(Some(value))
    }

    #[instrument(skip(self), fields(table = self.table.name()))]
    async fn remove(&self, key: &str) -> StoreResult<()> {
        let existed = self.table.delete(&partition_key(key), key).await?;
        tracing::debug!(existed, "Removed token");
        Ok(())
    }

    #[instrument(skip(self), fields(table = self.table.name()))]
    async fn get_all(&self, subject: &str) -> StoreResult<Vec<T>> {
        let rows = PagedScanner::new(&self.table)
            .scan(by_subject(subject))
            .await?;

        let token_rows = rows
            .iter()
            .map(TokenRow::from_table_row)
            .collect::<StoreResult<Vec<_>>>()?;

        try_join_all(
            token_rows
                .iter()
                .map(|row| self.serializer.from_json::<T>(&row.json)),
        )
        .await
    }

    #[instrument(skip(self), fields(table = self.table.name()))]
    async fn revoke(&self, subject: &str, client_id: &str) -> StoreResult<()> {
        let rows = PagedScanner::new(&self.table)
            .scan(by_subject_and_client(subject, client_id))
            .await?;
        let keys: Vec<(String, String)> = rows
            .into_iter()
            .map(|row| (row.partition_key, row.row_key))
            .collect();

        if keys.is_empty() {
            tracing::debug!("Nothing to revoke");
            return Ok(());
        }

        let mode = self.fan_out.mode;
        match self.fan_out.completion {
            FanOutCompletion::Awaited => {
                let (deleted, first_error) = delete_rows(&self.table, &keys, mode).await;
                tracing::info!(matched = keys.len(), deleted, "Revoked tokens");
                match first_error {
                    Some(err) => Err(err.into()),
                    None => Ok(()),
                }
            }
            FanOutCompletion::BestEffort => {
                let table = Arc::clone(&self.table);
                let matched = keys.len();
                tokio::spawn(async move {
                    let (deleted, first_error) = delete_rows(&table, &keys, mode).await;
                    if first_error.is_some() {
                        tracing::warn!(
                            table = table.name(),
                            matched,
                            deleted,
                            "Best-effort revocation left rows behind"
                        );
                    } else {
                        tracing::info!(table = table.name(), matched, deleted, "Revoked tokens");
                    }
                });
                Ok(())
            }
        }
    }
}
