//! Scope lookup trait.

use async_trait::async_trait;

use crate::StoreResult;
use crate::types::Scope;

/// Read access to scope definitions.
#[async_trait]
pub trait ScopeStore: Send + Sync {
    /// Returns the scopes whose names appear in `names`.
    ///
    /// Callers resolving a single placeholder pass exactly one name and
    /// expect exactly one result.
    async fn find_scopes(&self, names: &[String]) -> StoreResult<Vec<Scope>>;

    /// Returns all scopes, or only those listed in discovery when
    /// `public_only` is set.
    async fn get_scopes(&self, public_only: bool) -> StoreResult<Vec<Scope>>;
}
