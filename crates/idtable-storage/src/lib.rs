//! # idtable-storage
//!
//! Storage abstraction layer for partitioned table services.
//!
//! This crate defines the traits and types that all table backends must
//! implement. It does not contain any implementations - those are provided by
//! separate crates (see `idtable-db-memory`).
//!
//! ## Overview
//!
//! The main trait is [`TableBackend`], which defines the contract for:
//! - Idempotent table provisioning
//! - Point get / upsert / delete by `(partition key, row key)` with ETags
//! - Filtered range scans returning a page plus a continuation token
//!
//! ## Example
//!
//! ```ignore
//! use idtable_storage::{RowFilter, TableBackend, TableQuery};
//!
//! async fn first_page(backend: &dyn TableBackend) -> Result<usize, StorageError> {
//!     let query = TableQuery::new().with_filter(RowFilter::eq("SubjectId", "alice"));
//!     let page = backend.execute_query_segmented("RefreshTokens", &query, None).await?;
//!     Ok(page.rows.len())
//! }
//! ```

mod connection;
mod error;
mod traits;
mod types;

pub use connection::{ConnectionString, DEVELOPMENT_ACCOUNT};
pub use error::{ErrorCategory, StorageError};
pub use traits::{FixedConnector, TableBackend, TableConnector};
pub use types::{
    ContinuationToken, ETag, PARTITION_KEY, QueryPage, ROW_KEY, RowFilter, TableQuery, TableRow,
};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared backend handle.
pub type DynBackend = std::sync::Arc<dyn TableBackend>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use idtable_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::connection::ConnectionString;
    pub use crate::error::{ErrorCategory, StorageError};
    pub use crate::traits::{FixedConnector, TableBackend, TableConnector};
    pub use crate::types::{
        ContinuationToken, ETag, PARTITION_KEY, QueryPage, ROW_KEY, RowFilter, TableQuery,
        TableRow,
    };
    pub use crate::{DynBackend, StorageResult};
}
