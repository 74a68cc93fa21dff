//! Partitioned table store engine for OAuth/OIDC artifacts.
//!
//! Provides persistent storage for:
//!
//! - Client registrations ([`TableClientStore`])
//! - Remembered consent ([`TableConsentStore`])
//! - Refresh tokens ([`TableRefreshTokenStore`])
//! - Reference token handles ([`TableTokenHandleStore`])
//!
//! Tokens are stored as JSON with their client and scopes reduced to
//! placeholders; reads resolve them through the client store and an injected
//! scope store. Backend calls run under a per-table [`RetryPolicy`], multi-row
//! reads go through the [`PagedScanner`], and each table is provisioned on
//! first use.
//!
//! # Example
//!
//! ```ignore
//! use idtable_auth::{InMemoryScopeStore, TransientDataStore};
//! use idtable_auth_table::{TableAuthStorage, config::loader};
//! use idtable_db_memory::InMemoryTableService;
//!
//! let config = loader::load_config(Some("idtable.toml".as_ref()))?;
//! let storage = TableAuthStorage::new(
//!     &config,
//!     Arc::new(InMemoryTableService::new()),
//!     Arc::new(InMemoryScopeStore::new(scopes)),
//! )?;
//!
//! storage.token_handles().store("handle-1", &token).await?;
//! let token = storage.token_handles().get("handle-1").await?;
//! ```

pub mod client;
pub mod config;
pub mod consent;
pub mod partition;
pub mod retry;
pub mod rows;
pub mod scan;
pub mod table;
pub mod token;

use std::sync::Arc;

use idtable_auth::{ArtifactSerializer, ReferenceResolver, ScopeStore, StoreResult};
use idtable_storage::TableConnector;

pub use client::TableClientStore;
pub use crate::config::{
    ArtifactKind, ConfigError, FanOutCompletion, FanOutConfig, FanOutMode, RetryConfig,
    TableSection, TableStoreConfig, TokenTableSection,
};
pub use consent::TableConsentStore;
pub use partition::partition_key;
pub use retry::RetryPolicy;
pub use scan::PagedScanner;
pub use table::LazyTable;
pub use token::{TableRefreshTokenStore, TableTokenHandleStore, TableTokenStore};

// =============================================================================
// Table Auth Storage
// =============================================================================

/// The four artifact stores over one backend connection.
///
/// The token stores resolve `{ clientId }` placeholders through this
/// instance's client store and `{ name }` placeholders through the scope store
/// passed to [`TableAuthStorage::new`].
#[derive(Clone)]
pub struct TableAuthStorage {
    clients: Arc<TableClientStore>,
    consents: Arc<TableConsentStore>,
    refresh_tokens: Arc<TableRefreshTokenStore>,
    token_handles: Arc<TableTokenHandleStore>,
    scopes: Arc<dyn ScopeStore>,
    serializer: ArtifactSerializer,
}

impl TableAuthStorage {
    /// Builds all stores. No backend call is made until a store is used.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Configuration` if `config` does not validate.
    pub fn new(
        config: &TableStoreConfig,
        connector: Arc<dyn TableConnector>,
        scopes: Arc<dyn ScopeStore>,
    ) -> StoreResult<Self> {
        config.validate()?;
        let connection = config.connection()?;

        let table = |kind: ArtifactKind| {
            LazyTable::new(
                Arc::clone(&connector),
                connection.clone(),
                config.table_name(kind),
                config.retry_policy(kind),
            )
        };

        let clients = Arc::new(TableClientStore::new(table(ArtifactKind::Clients)));
        let consents = Arc::new(TableConsentStore::new(table(ArtifactKind::Consents)));

        let resolver = ReferenceResolver::new(clients.clone(), Arc::clone(&scopes));
        let serializer = ArtifactSerializer::new(resolver);

        let refresh_tokens = Arc::new(
            TableRefreshTokenStore::new(table(ArtifactKind::RefreshTokens), serializer.clone())
                .with_fan_out(config.refresh_tokens.revoke),
        );
        let token_handles = Arc::new(
            TableTokenHandleStore::new(table(ArtifactKind::TokenHandles), serializer.clone())
                .with_fan_out(config.token_handles.revoke),
        );

        tracing::debug!(
            account = connection.account_name(),
            "Initialized table auth storage"
        );

        Ok(Self {
            clients,
            consents,
            refresh_tokens,
            token_handles,
            scopes,
            serializer,
        })
    }

    // -------------------------------------------------------------------------
    // Storage Accessors
    // -------------------------------------------------------------------------

    /// Client store; also the client lookup of the token stores.
    #[must_use]
    pub fn clients(&self) -> &Arc<TableClientStore> {
        &self.clients
    }

    /// Consent store.
    #[must_use]
    pub fn consents(&self) -> &Arc<TableConsentStore> {
        &self.consents
    }

    /// Refresh token store.
    #[must_use]
    pub fn refresh_tokens(&self) -> &Arc<TableRefreshTokenStore> {
        &self.refresh_tokens
    }

    /// Token handle store.
    #[must_use]
    pub fn token_handles(&self) -> &Arc<TableTokenHandleStore> {
        &self.token_handles
    }

    /// Scope lookup used when decoding tokens.
    #[must_use]
    pub fn scopes(&self) -> &Arc<dyn ScopeStore> {
        &self.scopes
    }

    /// Serializer shared by the token stores.
    #[must_use]
    pub fn serializer(&self) -> &ArtifactSerializer {
        &self.serializer
    }
}

impl std::fmt::Debug for TableAuthStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableAuthStorage")
            .field("clients", self.clients.table())
            .field("consents", self.consents.table())
            .field("refresh_tokens", self.refresh_tokens.table())
            .field("token_handles", self.token_handles.table())
            .finish_non_exhaustive()
    }
}
