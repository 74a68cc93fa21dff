//! In-memory client and scope stores.
//!
//! Clients and scopes are frequently configured in code rather than persisted;
//! these stores serve that case and double as lookup collaborators in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::StoreResult;
use crate::storage::{ClientStore, ScopeStore};
use crate::types::{Client, Scope};

/// Client registrations held in memory.
#[derive(Debug, Default)]
pub struct InMemoryClientStore {
    clients: RwLock<HashMap<String, Client>>,
}

impl InMemoryClientStore {
    /// Creates a store seeded with `clients`.
    #[must_use]
    pub fn new(clients: impl IntoIterator<Item = Client>) -> Self {
        let clients = clients
            .into_iter()
            .map(|c| (c.client_id.clone(), c))
            .collect();
        Self {
            clients: RwLock::new(clients),
        }
    }

    /// Adds or replaces a client.
    pub async fn insert(&self, client: Client) {
        self.clients
            .write()
            .await
            .insert(client.client_id.clone(), client);
    }

    /// Removes a client, returning it if it was present.
    pub async fn remove(&self, client_id: &str) -> Option<Client> {
        self.clients.write().await.remove(client_id)
    }
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn find_client_by_id(&self, client_id: &str) -> StoreResult<Option<Client>> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }
}

/// Scope definitions held in memory, in registration order.
#[derive(Debug, Default)]
pub struct InMemoryScopeStore {
    scopes: RwLock<Vec<Scope>>,
}

impl InMemoryScopeStore {
    /// Creates a store seeded with `scopes`.
    #[must_use]
    pub fn new(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self {
            scopes: RwLock::new(scopes.into_iter().collect()),
        }
    }

    /// Appends a scope definition. Duplicate names are kept as-is.
    pub async fn insert(&self, scope: Scope) {
        self.scopes.write().await.push(scope);
    }

    /// Removes every definition with the given name.
    pub async fn remove(&self, name: &str) {
        self.scopes.write().await.retain(|s| s.name != name);
    }
}

#[async_trait]
impl ScopeStore for InMemoryScopeStore {
    async fn find_scopes(&self, names: &[String]) -> StoreResult<Vec<Scope>> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .iter()
            .filter(|s| names.iter().any(|n| n == &s.name))
            .cloned()
            .collect())
    }

    async fn get_scopes(&self, public_only: bool) -> StoreResult<Vec<Scope>> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .iter()
            .filter(|s| !public_only || s.show_in_discovery_document)
            .cloned()
            .collect())
    }
}
