//! Row shapes of the artifact tables.
//!
//! - token: `(partition_key(key), key)` with `Json`, `SubjectId`, `ClientId`
//! - client: `(partition_key(client_id), client_id)` with `Json`
//! - consent: `(subject, client_id)` with `Scopes`, comma-joined
//!
//! The token index columns are always derived from the artifact itself on
//! write, never supplied separately.

use idtable_auth::{StoreError, StoreResult, TokenMetadata};
use idtable_storage::{PARTITION_KEY, RowFilter, TableRow};

use crate::partition::partition_key;

/// Column names.
pub mod columns {
    /// Serialized artifact.
    pub const JSON: &str = "Json";
    /// Subject index column.
    pub const SUBJECT_ID: &str = "SubjectId";
    /// Client index column.
    pub const CLIENT_ID: &str = "ClientId";
    /// Comma-joined granted scopes.
    pub const SCOPES: &str = "Scopes";
}

/// Scope list delimiter in consent rows.
pub const SCOPE_DELIMITER: char = ',';

// =============================================================================
// Filters
// =============================================================================

/// `SubjectId eq subject`
#[must_use]
pub fn by_subject(subject: &str) -> RowFilter {
    RowFilter::eq(columns::SUBJECT_ID, subject)
}

/// `SubjectId eq subject and ClientId eq client_id`
#[must_use]
pub fn by_subject_and_client(subject: &str, client_id: &str) -> RowFilter {
    by_subject(subject).and(RowFilter::eq(columns::CLIENT_ID, client_id))
}

/// `PartitionKey eq subject`, the consent partition of a subject.
#[must_use]
pub fn by_consent_partition(subject: &str) -> RowFilter {
    RowFilter::eq(PARTITION_KEY, subject)
}

fn json_column(row: &TableRow) -> StoreResult<&str> {
    row.property(columns::JSON).ok_or_else(|| {
        StoreError::malformed_payload(format!(
            "row {}/{} has no {} column",
            row.partition_key,
            row.row_key,
            columns::JSON
        ))
    })
}

// =============================================================================
// Token rows
// =============================================================================

/// A token row: payload plus denormalized index columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow {
    /// Logical key (row key).
    pub key: String,
    /// Serialized artifact.
    pub json: String,
    /// Subject index; `None` for subject-less tokens.
    pub subject_id: Option<String>,
    /// Client index.
    pub client_id: String,
}

impl TokenRow {
    /// Builds a row for `artifact`, taking the index columns from its
    /// metadata.
    #[must_use]
    pub fn new<T: TokenMetadata>(key: &str, json: String, artifact: &T) -> Self {
        Self {
            key: key.to_string(),
            json,
            subject_id: artifact.subject_id().map(str::to_string),
            client_id: artifact.client_id().to_string(),
        }
    }

    /// Converts to a backend row.
    #[must_use]
    pub fn into_table_row(self) -> TableRow {
        let mut row = TableRow::new(partition_key(&self.key), self.key)
            .with_property(columns::JSON, self.json)
            .with_property(columns::CLIENT_ID, self.client_id);
        if let Some(subject) = self.subject_id {
            row.set_property(columns::SUBJECT_ID, subject);
        }
        row
    }

    /// Reads a backend row.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MalformedPayload` if the `Json` column is missing.
    pub fn from_table_row(row: &TableRow) -> StoreResult<Self> {
        Ok(Self {
            key: row.row_key.clone(),
            json: json_column(row)?.to_string(),
            subject_id: row.property(columns::SUBJECT_ID).map(str::to_string),
            client_id: row
                .property(columns::CLIENT_ID)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

// =============================================================================
// Client rows
// =============================================================================

/// Builds a client row.
#[must_use]
pub fn client_row(client_id: &str, json: String) -> TableRow {
    TableRow::new(partition_key(client_id), client_id).with_property(columns::JSON, json)
}

/// Reads the payload of a client row.
///
/// # Errors
///
/// Returns `StoreError::MalformedPayload` if the `Json` column is missing.
pub fn client_json(row: &TableRow) -> StoreResult<&str> {
    json_column(row)
}

// =============================================================================
// Consent rows
// =============================================================================

/// Joins scope names for the `Scopes` column.
///
/// # Errors
///
/// Returns `StoreError::InvalidInput` if a name is empty or contains the
/// delimiter, since it could not be split back apart.
pub fn encode_scopes(scopes: &[String]) -> StoreResult<String> {
    if scopes.iter().any(String::is_empty) {
        return Err(StoreError::invalid_input("scope name must not be empty"));
    }
    if let Some(bad) = scopes.iter().find(|s| s.contains(SCOPE_DELIMITER)) {
        return Err(StoreError::invalid_input(format!(
            "scope name '{bad}' contains '{SCOPE_DELIMITER}'"
        )));
    }
    Ok(scopes.join(","))
}

/// Splits the `Scopes` column. An empty or missing column is an empty list.
#[must_use]
pub fn decode_scopes(column: Option<&str>) -> Vec<String> {
    match column {
        None | Some("") => Vec::new(),
        Some(joined) => joined.split(SCOPE_DELIMITER).map(str::to_string).collect(),
    }
}
