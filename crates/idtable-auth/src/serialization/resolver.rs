//! Resolution of reference placeholders through injected lookups.

use std::sync::Arc;

use crate::StoreResult;
use crate::error::{ReferenceKind, StoreError};
use crate::serialization::records::{ClientRef, ScopeRef};
use crate::storage::{ClientStore, ScopeStore};
use crate::types::{Client, Scope};

/// Turns `{ clientId }` / `{ name }` placeholders back into full objects.
///
/// Every resolution is awaited in place; lookup failures (including a dropped
/// caller future) end the decode rather than producing a partial artifact.
#[derive(Clone)]
pub struct ReferenceResolver {
    clients: Arc<dyn ClientStore>,
    scopes: Arc<dyn ScopeStore>,
}

impl ReferenceResolver {
    /// Creates a resolver over the given lookups.
    #[must_use]
    pub fn new(clients: Arc<dyn ClientStore>, scopes: Arc<dyn ScopeStore>) -> Self {
        Self { clients, scopes }
    }

    /// Resolves a client placeholder.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReferenceNotFound` if the client no longer exists,
    /// or the lookup's own error.
    pub async fn resolve_client(&self, reference: &ClientRef) -> StoreResult<Client> {
        self.clients
            .find_client_by_id(&reference.client_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(client_id = %reference.client_id, "Referenced client missing");
                StoreError::reference_not_found(ReferenceKind::Client, &reference.client_id)
            })
    }

    /// Resolves a scope placeholder. Exactly one match is required.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReferenceNotFound` for zero matches and
    /// `StoreError::AmbiguousReference` for more than one.
    pub async fn resolve_scope(&self, reference: &ScopeRef) -> StoreResult<Scope> {
        let mut found = self
            .scopes
            .find_scopes(std::slice::from_ref(&reference.name))
            .await?;

        match found.len() {
            1 => Ok(found.remove(0)),
            0 => {
                tracing::warn!(scope = %reference.name, "Referenced scope missing");
                Err(StoreError::reference_not_found(
                    ReferenceKind::Scope,
                    &reference.name,
                ))
            }
            count => Err(StoreError::ambiguous_reference(
                ReferenceKind::Scope,
                &reference.name,
                count,
            )),
        }
    }

    /// Resolves scope placeholders in order.
    pub async fn resolve_scopes(&self, references: &[ScopeRef]) -> StoreResult<Vec<Scope>> {
        let mut scopes = Vec::with_capacity(references.len());
        for reference in references {
            scopes.push(self.resolve_scope(reference).await?);
        }
        Ok(scopes)
    }
}

impl std::fmt::Debug for ReferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceResolver").finish_non_exhaustive()
    }
}
