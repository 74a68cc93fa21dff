//! Storage error types for the table storage abstraction layer.
//!
//! This module defines all error types that a table backend can report.

use std::fmt;

/// Errors that can occur during table storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The addressed row does not exist.
    #[error("Row not found: {table}({partition_key}, {row_key})")]
    NotFound {
        /// The table that was queried.
        table: String,
        /// Partition key of the missing row.
        partition_key: String,
        /// Row key of the missing row.
        row_key: String,
    },

    /// The addressed table does not exist.
    #[error("Table not found: {table}")]
    TableNotFound {
        /// The missing table name.
        table: String,
    },

    /// An ETag precondition did not hold.
    #[error("Version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// The ETag supplied by the caller.
        expected: String,
        /// The ETag currently stored.
        actual: String,
    },

    /// The connection descriptor could not be parsed.
    #[error("Invalid connection string: {message}")]
    InvalidConnectionString {
        /// Description of the parse failure.
        message: String,
    },

    /// The row is not acceptable to the backend.
    #[error("Invalid row: {message}")]
    InvalidRow {
        /// Description of why the row is invalid.
        message: String,
    },

    /// A continuation token was not issued by this backend.
    #[error("Invalid continuation token: {message}")]
    InvalidContinuation {
        /// Description of the decode failure.
        message: String,
    },

    /// The backend is temporarily unreachable or throttling.
    #[error("Backend unavailable: {message}")]
    Unavailable {
        /// Description of the outage.
        message: String,
    },

    /// The backend did not answer in time.
    #[error("Operation timed out: {message}")]
    Timeout {
        /// Description of the timed out operation.
        message: String,
    },

    /// An internal backend error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(
        table: impl Into<String>,
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            table: table.into(),
            partition_key: partition_key.into(),
            row_key: row_key.into(),
        }
    }

    /// Creates a new `TableNotFound` error.
    #[must_use]
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    /// Creates a new `VersionConflict` error.
    #[must_use]
    pub fn version_conflict(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::VersionConflict {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `InvalidConnectionString` error.
    #[must_use]
    pub fn invalid_connection_string(message: impl Into<String>) -> Self {
        Self::InvalidConnectionString {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRow` error.
    #[must_use]
    pub fn invalid_row(message: impl Into<String>) -> Self {
        Self::InvalidRow {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidContinuation` error.
    #[must_use]
    pub fn invalid_continuation(message: impl Into<String>) -> Self {
        Self::InvalidContinuation {
            message: message.into(),
        }
    }

    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a row not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a version conflict error.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Returns `true` if a later attempt of the same call could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::TableNotFound { .. } => ErrorCategory::NotFound,
            Self::VersionConflict { .. } => ErrorCategory::Conflict,
            Self::InvalidConnectionString { .. }
            | Self::InvalidRow { .. }
            | Self::InvalidContinuation { .. } => ErrorCategory::Validation,
            Self::Unavailable { .. } | Self::Timeout { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Row or table not found.
    NotFound,
    /// ETag precondition failed.
    Conflict,
    /// Malformed input.
    Validation,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
