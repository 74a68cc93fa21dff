//! Client registrations stored in full as JSON.

use async_trait::async_trait;
use idtable_auth::{Client, ClientStore, StoreError, StoreResult};
use tracing::instrument;

use crate::partition::partition_key;
use crate::rows::{client_json, client_row};
use crate::table::LazyTable;

/// Table-backed client store.
///
/// Also serves as the client lookup of the token stores, which resolve
/// `{ clientId }` placeholders through [`ClientStore::find_client_by_id`].
#[derive(Debug)]
pub struct TableClientStore {
    table: LazyTable,
}

impl TableClientStore {
    /// Creates a store over `table`.
    #[must_use]
    pub fn new(table: LazyTable) -> Self {
        Self { table }
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &LazyTable {
        &self.table
    }

    /// Saves a client, replacing any previous registration with the same id.
    #[instrument(skip(self, client), fields(client_id = %client.client_id))]
    pub async fn store_client(&self, client: &Client) -> StoreResult<()> {
        let json =
            serde_json::to_string(client).map_err(|e| StoreError::serialization(e.to_string()))?;
        self.table
            .insert_or_replace(client_row(&client.client_id, json))
            .await?;
        tracing::debug!("Stored client");
        Ok(())
    }

    /// Removes a client. Unknown ids are not an error.
    ///
    /// Tokens issued to the client stay in their tables but no longer decode.
    #[instrument(skip(self))]
    pub async fn remove_client(&self, client_id: &str) -> StoreResult<()> {
        let existed = self
            .table
            .delete(&partition_key(client_id), client_id)
            .await?;
        tracing::debug!(existed, "Removed client");
        Ok(())
    }
}

#[async_trait]
impl ClientStore for TableClientStore {
    #[instrument(skip(self))]
    async fn find_client_by_id(&self, client_id: &str) -> StoreResult<Option<Client>> {
        let Some(row) = self
            .table
            .retrieve(&partition_key(client_id), client_id)
            .await?
        else {
            return Ok(None);
        };

        let client = serde_json::from_str(client_json(&row)?)
            .map_err(|e| StoreError::malformed_payload(e.to_string()))?;
        Ok(Some(client))
    }
}
