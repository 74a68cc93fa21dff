//! Storage trait for short-lived token artifacts.
//!
//! # Security Considerations
//!
//! - `get_all` and `revoke` are all-or-nothing: a failure part way through a
//!   scan is reported as a failure, never as a shorter list
//! - Revocation must not leave matching rows behind silently

use async_trait::async_trait;

use crate::StoreResult;
use crate::types::{RefreshToken, Token, TokenMetadata};

/// Keyed storage for a token artifact kind.
///
/// Keys are opaque handles issued to clients. Rows are additionally indexed by
/// subject and client so that they can be enumerated and revoked.
#[async_trait]
pub trait TransientDataStore<T>: Send + Sync
where
    T: TokenMetadata + Send + Sync + 'static,
{
    /// Saves the artifact under `key`, replacing any previous value.
    async fn store(&self, key: &str, value: &T) -> StoreResult<()>;

    /// Loads the artifact stored under `key`.
    ///
    /// Returns `None` if the key is unknown.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReferenceNotFound` / `AmbiguousReference` if the
    /// artifact's client or scopes can no longer be resolved.
    async fn get(&self, key: &str) -> StoreResult<Option<T>>;

    /// Removes the artifact stored under `key`. Unknown keys are not an error.
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Loads every artifact issued for `subject`.
    async fn get_all(&self, subject: &str) -> StoreResult<Vec<T>>;

    /// Removes every artifact issued for `subject` to `client_id`.
    async fn revoke(&self, subject: &str, client_id: &str) -> StoreResult<()>;
}

/// Storage for refresh tokens.
pub trait RefreshTokenStore: TransientDataStore<RefreshToken> {}

impl<S> RefreshTokenStore for S where S: TransientDataStore<RefreshToken> + ?Sized {}

/// Storage for reference access token handles.
pub trait TokenHandleStore: TransientDataStore<Token> {}

impl<S> TokenHandleStore for S where S: TransientDataStore<Token> + ?Sized {}
