//! Store error types.
//!
//! This module defines every failure an artifact store can surface. A point
//! lookup miss is *not* an error; it is reported as `None`.

use std::fmt;

use idtable_storage::StorageError;

/// The kind of entity a reference placeholder points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A `{ clientId }` placeholder.
    Client,
    /// A `{ name }` scope placeholder.
    Scope,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Scope => write!(f, "scope"),
        }
    }
}

/// Errors that can occur while storing, loading or decoding artifacts.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A referenced client or scope no longer exists.
    #[error("Referenced {kind} '{id}' not found")]
    ReferenceNotFound {
        /// What kind of entity was referenced.
        kind: ReferenceKind,
        /// The identifier carried by the placeholder.
        id: String,
    },

    /// A scope lookup returned more than one match for a single name.
    #[error("Referenced {kind} '{id}' is ambiguous ({count} matches)")]
    AmbiguousReference {
        /// What kind of entity was referenced.
        kind: ReferenceKind,
        /// The identifier carried by the placeholder.
        id: String,
        /// Number of matches returned by the lookup.
        count: usize,
    },

    /// The stored payload is not valid for the artifact kind.
    #[error("Malformed payload: {message}")]
    MalformedPayload {
        /// Description of the decode failure.
        message: String,
    },

    /// The artifact could not be encoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the encode failure.
        message: String,
    },

    /// The caller supplied a value the store cannot persist.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of why the input is invalid.
        message: String,
    },

    /// A client or scope lookup collaborator failed.
    #[error("Lookup failed: {message}")]
    Lookup {
        /// Description of the lookup failure.
        message: String,
    },

    /// The table backend failed.
    #[error("Backend error: {0}")]
    Backend(#[from] StorageError),

    /// The store configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `ReferenceNotFound` error.
    #[must_use]
    pub fn reference_not_found(kind: ReferenceKind, id: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates a new `AmbiguousReference` error.
    #[must_use]
    pub fn ambiguous_reference(kind: ReferenceKind, id: impl Into<String>, count: usize) -> Self {
        Self::AmbiguousReference {
            kind,
            id: id.into(),
            count,
        }
    }

    /// Creates a new `MalformedPayload` error.
    #[must_use]
    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// Creates a new `Serialization` error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a new `Lookup` error.
    #[must_use]
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
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

    /// Returns `true` if this is a `ReferenceNotFound` error.
    #[must_use]
    pub fn is_reference_not_found(&self) -> bool {
        matches!(self, Self::ReferenceNotFound { .. })
    }

    /// Returns `true` if this is an `AmbiguousReference` error.
    #[must_use]
    pub fn is_ambiguous_reference(&self) -> bool {
        matches!(self, Self::AmbiguousReference { .. })
    }

    /// Returns `true` if this is a `MalformedPayload` error.
    #[must_use]
    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, Self::MalformedPayload { .. })
    }

    /// Returns `true` if this is a backend error.
    #[must_use]
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    /// Returns `true` if the stored data itself is inconsistent.
    ///
    /// These failures are never retried and never reported as "absent".
    #[must_use]
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            Self::ReferenceNotFound { .. }
                | Self::AmbiguousReference { .. }
                | Self::MalformedPayload { .. }
        )
    }

    /// Returns `true` if the underlying backend fault is transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Backend(err) => err.is_transient(),
            _ => false,
        }
    }
}
