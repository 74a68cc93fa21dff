//! User consent storage trait.
//!
//! Consents are keyed by `(subject, client_id)` and let the authorization
//! endpoint skip the consent screen on repeat authorizations.

use async_trait::async_trait;

use crate::StoreResult;
use crate::types::Consent;

/// Storage trait for remembered consent.
#[async_trait]
pub trait ConsentStore: Send + Sync {
    /// Loads every consent the subject has granted.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any page of the underlying scan fails.
    async fn load_all(&self, subject: &str) -> StoreResult<Vec<Consent>>;

    /// Removes the subject's consent for a client. Absent consent is not an
    /// error.
    async fn revoke(&self, subject: &str, client_id: &str) -> StoreResult<()>;

    /// Loads the subject's consent for a client.
    ///
    /// Returns `None` if no consent was remembered.
    async fn load(&self, subject: &str, client_id: &str) -> StoreResult<Option<Consent>>;

    /// Saves consent, replacing any previous record for the same pair.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if a scope name contains a comma.
    async fn update(&self, consent: &Consent) -> StoreResult<()>;
}
