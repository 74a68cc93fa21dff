//! OAuth 2.0 / OpenID Connect artifact model for IdTable.
//!
//! This crate holds the pieces of an artifact store that do not depend on a
//! particular backend:
//!
//! - [`types`] - clients, scopes, consents, claims and tokens
//! - [`storage`] - the store traits plus in-memory client and scope stores
//! - [`serialization`] - JSON encoding with client/scope placeholders that are
//!   resolved through injected lookups on read
//! - [`error`] - the [`StoreError`] type shared by every store
//!
//! Table-backed implementations live in `idtable-auth-table`.

pub mod error;
pub mod serialization;
pub mod storage;
pub mod types;

pub use error::{ReferenceKind, StoreError};
pub use serialization::{ArtifactSerializer, PersistedArtifact, ReferenceResolver};
pub use storage::{
    ClientStore, ConsentStore, InMemoryClientStore, InMemoryScopeStore, RefreshTokenStore,
    ScopeStore, TokenHandleStore, TransientDataStore,
};
pub use types::{
    ACCESS_TOKEN_TYPE, Claim, ClaimsIdentity, ClaimsPrincipal, Client, Consent, Flow,
    RefreshToken, Scope, ScopeClaim, ScopeType, Token, TokenMetadata, TokenUsage, claim_types,
};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenient re-exports for store implementations.
pub mod prelude {
    pub use crate::StoreResult;
    pub use crate::error::StoreError;
    pub use crate::serialization::{ArtifactSerializer, PersistedArtifact, ReferenceResolver};
    pub use crate::storage::{
        ClientStore, ConsentStore, RefreshTokenStore, ScopeStore, TokenHandleStore,
        TransientDataStore,
    };
    pub use crate::types::{Client, Consent, RefreshToken, Scope, Token, TokenMetadata};
}
