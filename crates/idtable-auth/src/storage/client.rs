//! Client lookup trait.
//!
//! Token deserialization resolves `{ clientId }` placeholders through this
//! interface.

use async_trait::async_trait;

use crate::StoreResult;
use crate::types::Client;

/// Read access to client registrations.
///
/// # Example
///
/// ```ignore
/// use idtable_auth::storage::ClientStore;
///
/// async fn example(store: &impl ClientStore) -> StoreResult<()> {
///     if let Some(client) = store.find_client_by_id("web").await? {
///         println!("Found client: {}", client.client_name);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Finds a client by its client_id.
    ///
    /// Returns `None` if the client doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    async fn find_client_by_id(&self, client_id: &str) -> StoreResult<Option<Client>>;
}
