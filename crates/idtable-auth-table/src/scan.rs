//! Multi-page filtered scans.

use idtable_storage::{RowFilter, StorageResult, TableQuery, TableRow};

use crate::table::LazyTable;

/// Drives a filtered range query to exhaustion.
///
/// Pages are fetched one after another, following the continuation token until
/// the backend returns none. Rows are accumulated in backend order with no
/// reordering or deduplication. Each page fetch runs under the table's retry
/// policy; if a page still fails, the scan fails and the rows gathered so far
/// are dropped.
#[derive(Debug, Clone, Copy)]
pub struct PagedScanner<'a> {
    table: &'a LazyTable,
    page_size: Option<usize>,
}

impl<'a> PagedScanner<'a> {
    /// Creates a scanner over `table` using the backend's page size.
    #[must_use]
    pub fn new(table: &'a LazyTable) -> Self {
        Self {
            table,
            page_size: None,
        }
    }

    /// Requests at most `page_size` rows per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Collects every row matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the first page fetch failure that outlived the retry policy.
    /// No partial result is ever returned.
    pub async fn scan(&self, filter: RowFilter) -> StorageResult<Vec<TableRow>> {
        let mut query = TableQuery::new().with_filter(filter);
        if let Some(take) = self.page_size {
            query = query.with_take(take);
        }

        let mut rows = Vec::new();
        let mut continuation = None;
        let mut pages = 0usize;

        loop {
            let page = match self.table.query_page(&query, continuation.as_ref()).await {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(
                        table = self.table.name(),
                        pages,
                        discarded = rows.len(),
                        error = %err,
                        "Scan aborted"
                    );
                    return Err(err);
                }
            };

            pages += 1;
            rows.extend(page.rows);
            continuation = page.continuation;
            if continuation.is_none() {
                break;
            }
        }

        tracing::debug!(
            table = self.table.name(),
            pages,
            rows = rows.len(),
            "Scan complete"
        );
        Ok(rows)
    }
}
