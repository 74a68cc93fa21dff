//! Remembered consent, one row per `(subject, client)`.
//!
//! Consent rows carry no JSON payload. The subject is the partition key, the
//! client id is the row key and the granted scopes are one comma-joined
//! column, so a subject's consents live in a single partition.

use async_trait::async_trait;
use idtable_auth::{Consent, ConsentStore, StoreResult};
use idtable_storage::TableRow;
use tracing::instrument;

use crate::rows::{by_consent_partition, columns, decode_scopes, encode_scopes};
use crate::scan::PagedScanner;
use crate::table::LazyTable;

/// Table-backed consent store.
#[derive(Debug)]
pub struct TableConsentStore {
    table: LazyTable,
}

impl TableConsentStore {
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
}

fn consent_from_row(row: &TableRow) -> Consent {
    Consent {
        subject: row.partition_key.clone(),
        client_id: row.row_key.clone(),
        scopes: decode_scopes(row.property(columns::SCOPES)),
    }
}

#[async_trait]
impl ConsentStore for TableConsentStore {
    #[instrument(skip(self))]
    async fn load_all(&self, subject: &str) -> StoreResult<Vec<Consent>> {
        let rows = PagedScanner::new(&self.table)
            .scan(by_consent_partition(subject))
            .await?;
        Ok(rows.iter().map(consent_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn revoke(&self, subject: &str, client_id: &str) -> StoreResult<()> {
        let existed = self.table.delete(subject, client_id).await?;
        tracing::debug!(existed, "Revoked consent");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self, subject: &str, client_id: &str) -> StoreResult<Option<Consent>> {
        let row = self.table.retrieve(subject, client_id).await?;
        Ok(row.as_ref().map(consent_from_row))
    }

    #[instrument(
        skip(self, consent),
        fields(subject = %consent.subject, client_id = %consent.client_id)
    )]
    async fn update(&self, consent: &Consent) -> StoreResult<()> {
        let scopes = encode_scopes(&consent.scopes)?;
        let row = TableRow::new(&consent.subject, &consent.client_id)
            .with_property(columns::SCOPES, scopes);
        self.table.insert_or_replace(row).await?;
        Ok(())
    }
}
