use std::sync::Arc;

use async_trait::async_trait;
use idtable_storage::{ConnectionString, StorageError, TableBackend, TableConnector};
use papaya::HashMap as PapayaHashMap;

use crate::InMemoryTableStorage;

/// Default maximum page size, mirroring the hosted table services.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

/// In-memory backend options.
#[derive(Debug, Clone)]
pub struct InMemoryOptions {
    /// Largest number of rows returned by one `execute_query_segmented` call.
    pub max_page_size: usize,
}

impl Default for InMemoryOptions {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// A process-local table service holding one [`InMemoryTableStorage`] per
/// storage account.
///
/// Connection strings that name the same account share the same tables,
/// so several stores configured with one descriptor see each other's rows.
#[derive(Debug, Default)]
pub struct InMemoryTableService {
    accounts: PapayaHashMap<String, Arc<InMemoryTableStorage>>,
    options: InMemoryOptions,
}

impl InMemoryTableService {
    /// Creates an empty service with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty service whose accounts use `options`.
    #[must_use]
    pub fn with_options(options: InMemoryOptions) -> Self {
        Self {
            accounts: PapayaHashMap::new(),
            options,
        }
    }

    /// Returns the storage for an account, creating it on first use.
    #[must_use]
    pub fn account(&self, name: &str) -> Arc<InMemoryTableStorage> {
        let guard = self.accounts.pin();
        let storage = guard.get_or_insert_with(name.to_string(), || {
            Arc::new(InMemoryTableStorage::with_options(self.options.clone()))
        });
        Arc::clone(storage)
    }
}

#[async_trait]
impl TableConnector for InMemoryTableService {
    async fn connect(
        &self,
        connection: &ConnectionString,
    ) -> Result<Arc<dyn TableBackend>, StorageError> {
        tracing::debug!(account = connection.account_name(), "Connecting to in-memory account");
        let storage: Arc<dyn TableBackend> = self.account(connection.account_name());
        Ok(storage)
    }
}
