//! Row, filter and paging types shared by all table backends.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Reserved column name addressing the partition key.
pub const PARTITION_KEY: &str = "PartitionKey";

/// Reserved column name addressing the row key.
pub const ROW_KEY: &str = "RowKey";

// =============================================================================
// Table Row
// =============================================================================

/// A single persisted row.
///
/// `(partition_key, row_key)` is the primary key. Payload columns are string
/// valued; the engine never needs any other column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// Coarse bucket the row lives in.
    pub partition_key: String,

    /// Identifier unique within the partition.
    pub row_key: String,

    /// Opaque version tag assigned by the backend on every write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Last modification time assigned by the backend.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub timestamp: Option<OffsetDateTime>,

    /// Payload columns.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl TableRow {
    /// Creates an empty row for the given key pair.
    #[must_use]
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            etag: None,
            timestamp: None,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style column setter.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Sets a payload column, replacing any previous value.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Returns a payload column.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Returns any column, including the two key columns.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&str> {
        match name {
            PARTITION_KEY => Some(&self.partition_key),
            ROW_KEY => Some(&self.row_key),
            other => self.property(other),
        }
    }
}

// =============================================================================
// ETag
// =============================================================================

/// Optimistic concurrency precondition for deletes and replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ETag {
    /// Unconditional (`*`): matches whatever version is stored.
    Any,
    /// Must match the stored version exactly.
    Exact(String),
}

impl ETag {
    /// Returns `true` if a row stored with `current` satisfies this precondition.
    #[must_use]
    pub fn matches(&self, current: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => current == Some(expected.as_str()),
        }
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Exact(tag) => write!(f, "{tag}"),
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Row filter evaluated by the backend during a range scan.
///
/// Only equality and conjunction are needed; backends filter on indexed
/// columns, never on payload content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// `column eq 'value'`
    Equal {
        /// Column name (may be a key column).
        column: String,
        /// Expected value.
        value: String,
    },
    /// Both filters must hold.
    And(Box<RowFilter>, Box<RowFilter>),
}

impl RowFilter {
    /// Equality on a single column.
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equal {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Conjunction of `self` and `other`.
    #[must_use]
    pub fn and(self, other: RowFilter) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Evaluates the filter against a row.
    #[must_use]
    pub fn matches(&self, row: &TableRow) -> bool {
        match self {
            Self::Equal { column, value } => row.column(column) == Some(value.as_str()),
            Self::And(left, right) => left.matches(row) && right.matches(row),
        }
    }
}

/// Renders the filter as an OData expression, e.g.
/// `SubjectId eq 'alice' and ClientId eq 'web'`.
impl fmt::Display for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal { column, value } => {
                write!(f, "{column} eq '{}'", value.replace('\'', "''"))
            }
            Self::And(left, right) => write!(f, "({left}) and ({right})"),
        }
    }
}

// =============================================================================
// Queries and pages
// =============================================================================

/// A filtered range query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQuery {
    /// Optional filter; `None` scans the whole table.
    pub filter: Option<RowFilter>,
    /// Optional page size hint. Backends may return fewer rows.
    pub take: Option<usize>,
}

impl TableQuery {
    /// Creates an unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    #[must_use]
    pub fn with_filter(mut self, filter: RowFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the page size hint.
    #[must_use]
    pub fn with_take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }
}

/// Opaque cursor to the next page of a range query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wraps a backend-issued cursor.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw cursor.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a range query.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    /// Rows in this page, in backend order.
    pub rows: Vec<TableRow>,
    /// Cursor to the next page; `None` means the scan is exhausted.
    pub continuation: Option<ContinuationToken>,
}

impl QueryPage {
    /// Creates a page.
    #[must_use]
    pub fn new(rows: Vec<TableRow>, continuation: Option<ContinuationToken>) -> Self {
        Self { rows, continuation }
    }

    /// Returns `true` if this is the last page.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_row(subject: &str, client: &str) -> TableRow {
        TableRow::new("00ff", "key-1")
            .with_property("SubjectId", subject)
            .with_property("ClientId", client)
    }

    #[test]
    fn test_column_access_includes_keys() {
        let row = token_row("alice", "web");
        assert_eq!(row.column(PARTITION_KEY), Some("00ff"));
        assert_eq!(row.column(ROW_KEY), Some("key-1"));
        assert_eq!(row.column("SubjectId"), Some("alice"));
        assert_eq!(row.column("Json"), None);
    }

    #[test]
    fn test_filter_conjunction() {
        let filter = RowFilter::eq("SubjectId", "alice").and(RowFilter::eq("ClientId", "web"));

        assert!(filter.matches(&token_row("alice", "web")));
        assert!(!filter.matches(&token_row("alice", "native")));
        assert!(!filter.matches(&token_row("bob", "web")));
    }

    #[test]
    fn test_filter_renders_odata() {
        let filter = RowFilter::eq("SubjectId", "o'brien").and(RowFilter::eq("ClientId", "web"));
        assert_eq!(
            filter.to_string(),
            "(SubjectId eq 'o''brien') and (ClientId eq 'web')"
        );
    }

    #[test]
    fn test_etag_matching() {
        assert!(ETag::Any.matches(None));
        assert!(ETag::Any.matches(Some("W/\"3\"")));
        assert!(ETag::Exact("W/\"3\"".into()).matches(Some("W/\"3\"")));
        assert!(!ETag::Exact("W/\"3\"".into()).matches(Some("W/\"4\"")));
        assert_eq!(ETag::Any.to_string(), "*");
    }
}
