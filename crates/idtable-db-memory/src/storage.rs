use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use idtable_storage::{
    ContinuationToken, ETag, QueryPage, StorageError, TableBackend, TableQuery, TableRow,
};
use papaya::HashMap as PapayaHashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::service::InMemoryOptions;

/// Primary key of a row inside one table.
pub type RowAddress = (String, String);

/// Rows of a single table, kept in `(partition_key, row_key)` order so that
/// range scans can resume from a continuation token.
#[derive(Debug, Default)]
pub(crate) struct TableData {
    rows: RwLock<BTreeMap<RowAddress, TableRow>>,
}

/// In-memory table backend using a papaya lock-free map of tables.
///
/// This implementation provides:
/// - Lock-free lookup of tables via `papaya::HashMap`
/// - Ordered rows per table behind a `tokio::sync::RwLock`
/// - Monotonic weak ETags (`W/"<n>"`) on every write
/// - Segmented queries with opaque continuation tokens
#[derive(Debug)]
pub struct InMemoryTableStorage {
    tables: PapayaHashMap<String, Arc<TableData>>,
    version_counter: AtomicU64,
    options: InMemoryOptions,
}

impl Default for InMemoryTableStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTableStorage {
    /// Creates a new in-memory backend with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(InMemoryOptions::default())
    }

    /// Creates a new in-memory backend with the given options.
    #[must_use]
    pub fn with_options(options: InMemoryOptions) -> Self {
        Self {
            tables: PapayaHashMap::new(),
            version_counter: AtomicU64::new(1),
            options,
        }
    }

    /// Generates the next ETag.
    fn next_etag(&self) -> String {
        let version = self.version_counter.fetch_add(1, Ordering::SeqCst);
        format!("W/\"{version}\"")
    }

    fn table(&self, name: &str) -> Result<Arc<TableData>, StorageError> {
        let guard = self.tables.pin();
        guard
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::table_not_found(name))
    }

    /// Returns `true` if the table has been provisioned.
    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.pin().contains_key(name)
    }

    /// Number of rows currently stored in a table (0 if it does not exist).
    pub async fn row_count(&self, name: &str) -> usize {
        match self.table(name) {
            Ok(table) => table.rows.read().await.len(),
            Err(_) => 0,
        }
    }

    /// Snapshot of every row in a table, in key order.
    pub async fn rows(&self, name: &str) -> Vec<TableRow> {
        match self.table(name) {
            Ok(table) => table.rows.read().await.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn page_size(&self, query: &TableQuery) -> usize {
        let max = self.options.max_page_size.max(1);
        query.take.map_or(max, |take| take.clamp(1, max))
    }
}

/// Characters the hosted table services refuse in key columns.
fn is_illegal_key(key: &str) -> bool {
    key.contains(['/', '\\', '#', '?'])
}

fn encode_continuation(address: &RowAddress) -> Result<ContinuationToken, StorageError> {
    let bytes = serde_json::to_vec(&[&address.0, &address.1])
        .map_err(|e| StorageError::internal(format!("continuation encode failed: {e}")))?;
    Ok(ContinuationToken::new(URL_SAFE_NO_PAD.encode(bytes)))
}

fn decode_continuation(token: &ContinuationToken) -> Result<RowAddress, StorageError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.as_str())
        .map_err(|e| StorageError::invalid_continuation(e.to_string()))?;
    let [partition_key, row_key]: [String; 2] = serde_json::from_slice(&bytes)
        .map_err(|e| StorageError::invalid_continuation(e.to_string()))?;
    Ok((partition_key, row_key))
}

#[async_trait]
impl TableBackend for InMemoryTableStorage {
    async fn create_table_if_not_exists(&self, table: &str) -> Result<bool, StorageError> {
        let guard = self.tables.pin();
        let created = guard
            .try_insert(table.to_string(), Arc::new(TableData::default()))
            .is_ok();
        if created {
            tracing::info!(table, "Created in-memory table");
        }
        Ok(created)
    }

    async fn retrieve(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableRow>, StorageError> {
        let data = self.table(table)?;
        let rows = data.rows.read().await;
        Ok(rows
            .get(&(partition_key.to_string(), row_key.to_string()))
            .cloned())
    }

    async fn insert_or_replace(
        &self,
        table: &str,
        mut row: TableRow,
    ) -> Result<TableRow, StorageError> {
        if is_illegal_key(&row.partition_key) || is_illegal_key(&row.row_key) {
            return Err(StorageError::invalid_row(
                "keys must not contain '/', '\\', '#' or '?'",
            ));
        }

        let data = self.table(table)?;
        row.etag = Some(self.next_etag());
        row.timestamp = Some(OffsetDateTime::now_utc());

        let address = (row.partition_key.clone(), row.row_key.clone());
        data.rows.write().await.insert(address, row.clone());
        Ok(row)
    }

    async fn delete(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
        etag: &ETag,
    ) -> Result<(), StorageError> {
        let data = self.table(table)?;
        let mut rows = data.rows.write().await;
        let address = (partition_key.to_string(), row_key.to_string());

        let Some(existing) = rows.get(&address) else {
            return Err(StorageError::not_found(table, partition_key, row_key));
        };

        if !etag.matches(existing.etag.as_deref()) {
            return Err(StorageError::version_conflict(
                etag.to_string(),
                existing.etag.clone().unwrap_or_default(),
            ));
        }

        rows.remove(&address);
        Ok(())
    }

    async fn execute_query_segmented(
        &self,
        table: &str,
        query: &TableQuery,
        continuation: Option<&ContinuationToken>,
    ) -> Result<QueryPage, StorageError> {
        let data = self.table(table)?;
        let start = match continuation {
            Some(token) => Bound::Excluded(decode_continuation(token)?),
            None => Bound::Unbounded,
        };
        let page_size = self.page_size(query);

        let rows = data.rows.read().await;
        let mut matching = rows
            .range((start, Bound::Unbounded))
            .filter(|(_, row)| query.filter.as_ref().is_none_or(|f| f.matches(row)));

        let mut page = Vec::with_capacity(page_size.min(64));
        let mut last = None;
        for (address, row) in matching.by_ref().take(page_size) {
            page.push(row.clone());
            last = Some(address);
        }

        let continuation = match (matching.next(), last) {
            (Some(_), Some(address)) => Some(encode_continuation(address)?),
            _ => None,
        };

        Ok(QueryPage::new(page, continuation))
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}
