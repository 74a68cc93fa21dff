//! Lazily provisioned table handle.
//!
//! The backend connection and the create-if-absent call happen on first use,
//! at most once per handle. A failed initialisation leaves the handle empty so
//! the next call tries again.

use std::sync::Arc;

use idtable_storage::{
    ConnectionString, ContinuationToken, DynBackend, ETag, QueryPage, StorageResult,
    TableConnector, TableQuery, TableRow,
};
use tokio::sync::OnceCell;

use crate::retry::RetryPolicy;

/// One logical table: connection descriptor, name, retry policy and the
/// lazily created backend handle.
///
/// Every backend call made through this type runs under the table's
/// [`RetryPolicy`]. Initialisation is part of the first attempt, so a
/// transient failure while provisioning is retried like any other call.
pub struct LazyTable {
    connector: Arc<dyn TableConnector>,
    connection: ConnectionString,
    name: String,
    retry: RetryPolicy,
    backend: OnceCell<DynBackend>,
}

impl LazyTable {
    /// Creates a handle. Nothing is contacted until the first call.
    #[must_use]
    pub fn new(
        connector: Arc<dyn TableConnector>,
        connection: ConnectionString,
        name: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            connector,
            connection,
            name: name.into(),
            retry,
            backend: OnceCell::new(),
        }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retry policy applied to every call.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns `true` once the table has been provisioned.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.backend.initialized()
    }

    /// Returns the backend, connecting and provisioning the table on first
    /// use.
    pub async fn backend(&self) -> StorageResult<&DynBackend> {
        self.backend
            .get_or_try_init(|| async {
                let backend = self.connector.connect(&self.connection).await?;
                if backend.create_table_if_not_exists(&self.name).await? {
                    tracing::info!(
                        table = %self.name,
                        backend = backend.backend_name(),
                        "Created table"
                    );
                } else {
                    tracing::debug!(table = %self.name, "Table already exists");
                }
                Ok(backend)
            })
            .await
    }

    /// Point read.
    pub async fn retrieve(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> StorageResult<Option<TableRow>> {
        self.retry
            .run("retrieve", move || async move {
                self.backend()
                    .await?
                    .retrieve(&self.name, partition_key, row_key)
                    .await
            })
            .await
    }

    /// Upsert.
    pub async fn insert_or_replace(&self, row: TableRow) -> StorageResult<TableRow> {
        let row = &row;
        self.retry
            .run("insert_or_replace", move || async move {
                self.backend()
                    .await?
                    .insert_or_replace(&self.name, row.clone())
                    .await
            })
            .await
    }

    /// Unconditional delete (`ETag: *`).
    ///
    /// Returns `false` if no row existed. A missing row is not an error.
    pub async fn delete(&self, partition_key: &str, row_key: &str) -> StorageResult<bool> {
        self.retry
            .run("delete", move || async move {
                match self
                    .backend()
                    .await?
                    .delete(&self.name, partition_key, row_key, &ETag::Any)
                    .await
                {
                    Err(err) if err.is_not_found() => Ok(false),
                    other => other.map(|()| true),
                }
            })
            .await
    }

    /// Fetches one page of a range query.
    pub async fn query_page(
        &self,
        query: &TableQuery,
        continuation: Option<&ContinuationToken>,
    ) -> StorageResult<QueryPage> {
        self.retry
            .run("execute_query_segmented", move || async move {
                self.backend()
                    .await?
                    .execute_query_segmented(&self.name, query, continuation)
                    .await
            })
            .await
    }
}

impl std::fmt::Debug for LazyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyTable")
            .field("name", &self.name)
            .field("retry", &self.retry)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use idtable_db_memory::InMemoryTableService;

    use super::*;

    fn table(service: Arc<InMemoryTableService>, name: &str) -> LazyTable {
        LazyTable::new(
            service,
            ConnectionString::parse("UseDevelopmentStorage=true").unwrap(),
            name,
            RetryPolicy::single_attempt(),
        )
    }

    #[tokio::test]
    async fn test_provisions_on_first_use_only() {
        let service = Arc::new(InMemoryTableService::new());
        let handle = table(service.clone(), "TokenHandle");
        let account = service.account(idtable_storage::DEVELOPMENT_ACCOUNT);

        assert!(!handle.is_initialized());
        assert!(!account.has_table("TokenHandle"));

        assert!(handle.retrieve("ab12", "k").await.unwrap().is_none());
        assert!(handle.is_initialized());
        assert!(account.has_table("TokenHandle"));
    }

    #[tokio::test]
    async fn test_concurrent_first_use() {
        let service = Arc::new(InMemoryTableService::new());
        let handle = Arc::new(table(service, "Consent"));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let handle = handle.clone();
                tokio::spawn(async move {
                    handle
                        .insert_or_replace(TableRow::new("alice", format!("client{i}")))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let page = handle.query_page(&TableQuery::new(), None).await.unwrap();
        assert_eq!(page.rows.len(), 8);
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_an_error() {
        let service = Arc::new(InMemoryTableService::new());
        let handle = table(service, "Clients");

        assert!(!handle.delete("ab12", "gone").await.unwrap());

        handle
            .insert_or_replace(TableRow::new("ab12", "present"))
            .await
            .unwrap();
        assert!(handle.delete("ab12", "present").await.unwrap());
        assert!(handle.retrieve("ab12", "present").await.unwrap().is_none());
    }
}
