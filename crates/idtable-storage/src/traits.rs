//! Storage traits for the table storage abstraction layer.
//!
//! This module defines the contract a partitioned table service must honour.

use std::sync::Arc;

use async_trait::async_trait;

use crate::connection::ConnectionString;
use crate::error::StorageError;
use crate::types::{ContinuationToken, ETag, QueryPage, TableQuery, TableRow};

/// A partitioned table service.
///
/// Rows are addressed by `(partition_key, row_key)`. Implementations must be
/// thread-safe (`Send + Sync`) and safe for concurrent use through a shared
/// handle.
///
/// # Example
///
/// ```ignore
/// use idtable_storage::{ETag, TableBackend, TableRow};
///
/// async fn touch(backend: &dyn TableBackend) -> Result<(), StorageError> {
///     backend.create_table_if_not_exists("TokenHandle").await?;
///     let row = TableRow::new("0a1b", "handle-1").with_property("Json", "{}");
///     backend.insert_or_replace("TokenHandle", row).await?;
///     backend.delete("TokenHandle", "0a1b", "handle-1", &ETag::Any).await
/// }
/// ```
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Creates the table unless it already exists.
    ///
    /// Returns `true` if this call created it. Concurrent callers racing on
    /// the same name must all succeed.
    async fn create_table_if_not_exists(&self, table: &str) -> Result<bool, StorageError>;

    /// Point read.
    ///
    /// Returns `None` if no row matches.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues or a missing table.
    async fn retrieve(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableRow>, StorageError>;

    /// Upsert: inserts the row or replaces every column of an existing one.
    ///
    /// Returns the stored row with its new ETag and timestamp.
    async fn insert_or_replace(&self, table: &str, row: TableRow)
    -> Result<TableRow, StorageError>;

    /// Deletes a row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the row does not exist and
    /// `StorageError::VersionConflict` if `etag` does not match.
    async fn delete(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
        etag: &ETag,
    ) -> Result<(), StorageError>;

    /// Executes one page of a filtered range query.
    ///
    /// Pass the previous page's continuation token to resume; `None` starts a
    /// new scan.
    async fn execute_query_segmented(
        &self,
        table: &str,
        query: &TableQuery,
        continuation: Option<&ContinuationToken>,
    ) -> Result<QueryPage, StorageError>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Resolves a connection descriptor to a live backend handle.
#[async_trait]
pub trait TableConnector: Send + Sync {
    /// Connects to the account addressed by `connection`.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be reached or the descriptor is
    /// not usable with this connector.
    async fn connect(
        &self,
        connection: &ConnectionString,
    ) -> Result<Arc<dyn TableBackend>, StorageError>;
}

/// A connector that always hands out the same backend.
///
/// Useful when the process only ever talks to one account.
#[derive(Clone)]
pub struct FixedConnector {
    backend: Arc<dyn TableBackend>,
}

impl FixedConnector {
    /// Wraps an existing backend.
    #[must_use]
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TableConnector for FixedConnector {
    async fn connect(
        &self,
        connection: &ConnectionString,
    ) -> Result<Arc<dyn TableBackend>, StorageError> {
        tracing::debug!(
            account = connection.account_name(),
            backend = self.backend.backend_name(),
            "Using fixed table backend"
        );
        Ok(Arc::clone(&self.backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that the traits are object-safe
    fn _assert_backend_object_safe(_: &dyn TableBackend) {}
    fn _assert_connector_object_safe(_: &dyn TableConnector) {}

    struct NullBackend;

    #[async_trait]
    impl TableBackend for NullBackend {
        async fn create_table_if_not_exists(&self, _table: &str) -> Result<bool, StorageError> {
            Ok(false)
        }

        async fn retrieve(
            &self,
            _table: &str,
            _partition_key: &str,
            _row_key: &str,
        ) -> Result<Option<TableRow>, StorageError> {
            Ok(None)
        }

        async fn insert_or_replace(
            &self,
            _table: &str,
            row: TableRow,
        ) -> Result<TableRow, StorageError> {
            Ok(row)
        }

        async fn delete(
            &self,
            table: &str,
            partition_key: &str,
            row_key: &str,
            _etag: &ETag,
        ) -> Result<(), StorageError> {
            Err(StorageError::not_found(table, partition_key, row_key))
        }

        async fn execute_query_segmented(
            &self,
            _table: &str,
            _query: &TableQuery,
            _continuation: Option<&ContinuationToken>,
        ) -> Result<QueryPage, StorageError> {
            Ok(QueryPage::new(Vec::new(), None))
        }

        fn backend_name(&self) -> &'static str {
            "null"
        }
    }

    #[tokio::test]
    async fn test_fixed_connector_hands_out_same_backend() {
        let backend: Arc<dyn TableBackend> = Arc::new(NullBackend);
        let connector = FixedConnector::new(Arc::clone(&backend));

        let first = ConnectionString::parse("UseDevelopmentStorage=true").unwrap();
        let second = ConnectionString::parse("AccountName=other;AccountKey=a2V5").unwrap();

        let a = connector.connect(&first).await.unwrap();
        let b = connector.connect(&second).await.unwrap();
        assert!(Arc::ptr_eq(&a, &backend));
        assert!(Arc::ptr_eq(&b, &backend));
        assert_eq!(a.backend_name(), "null");
    }
}
