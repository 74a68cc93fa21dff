//! In-memory table backend for IdTable.
//!
//! This crate provides an in-memory implementation of the `TableBackend`
//! trait from `idtable-storage`, using a papaya lock-free HashMap of tables.
//!
//! # Example
//!
//! ```ignore
//! use idtable_db_memory::InMemoryTableService;
//! use idtable_storage::{ConnectionString, TableConnector};
//!
//! let service = InMemoryTableService::new();
//! let backend = service
//!     .connect(&ConnectionString::parse("UseDevelopmentStorage=true")?)
//!     .await?;
//! backend.create_table_if_not_exists("TokenHandle").await?;
//! ```

pub mod service;
pub mod storage;

// Re-export the backend traits for convenience
pub use idtable_storage::{StorageError, TableBackend, TableConnector};

pub use service::{DEFAULT_MAX_PAGE_SIZE, InMemoryOptions, InMemoryTableService};
pub use storage::{InMemoryTableStorage, RowAddress};

/// Type alias for a shareable in-memory service.
pub type DynInMemoryService = std::sync::Arc<InMemoryTableService>;

/// Creates a new in-memory table service.
pub fn create_table_service() -> DynInMemoryService {
    std::sync::Arc::new(InMemoryTableService::new())
}
