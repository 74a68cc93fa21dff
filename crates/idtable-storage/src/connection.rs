//! Connection descriptors.
//!
//! Backends are addressed with `Key=Value;Key=Value` connection strings in the
//! style used by hosted table services:
//!
//! ```text
//! DefaultEndpointsProtocol=https;AccountName=idsrv;AccountKey=...;TableEndpoint=https://idsrv.table.example.net
//! UseDevelopmentStorage=true
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// Account name used by `UseDevelopmentStorage=true`.
pub const DEVELOPMENT_ACCOUNT: &str = "devstoreaccount1";

/// A parsed backend connection descriptor.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    account_name: String,
    account_key: Option<String>,
    table_endpoint: Option<String>,
    protocol: Option<String>,
    development: bool,
    extra: BTreeMap<String, String>,
}

impl ConnectionString {
    /// Parses a connection string.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidConnectionString` when a segment is not a
    /// `Key=Value` pair or when neither `AccountName` nor
    /// `UseDevelopmentStorage=true` is present.
    pub fn parse(input: &str) -> Result<Self, StorageError> {
        let mut pairs = BTreeMap::new();
        for segment in input.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                StorageError::invalid_connection_string(format!(
                    "segment '{segment}' is not a Key=Value pair"
                ))
            })?;
            // AccountKey values are base64 and may end in '='; split_once keeps them intact.
            pairs.insert(key.trim().to_string(), value.trim().to_string());
        }

        let development = pairs
            .remove("UseDevelopmentStorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let account_name = match pairs.remove("AccountName") {
            Some(name) if !name.is_empty() => name,
            _ if development => DEVELOPMENT_ACCOUNT.to_string(),
            _ => {
                return Err(StorageError::invalid_connection_string(
                    "missing AccountName",
                ));
            }
        };

        Ok(Self {
            account_name,
            account_key: pairs.remove("AccountKey"),
            table_endpoint: pairs.remove("TableEndpoint"),
            protocol: pairs.remove("DefaultEndpointsProtocol"),
            development,
            extra: pairs,
        })
    }

    /// Storage account the tables live in.
    #[must_use]
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Shared key, if supplied.
    #[must_use]
    pub fn account_key(&self) -> Option<&str> {
        self.account_key.as_deref()
    }

    /// Explicit table service endpoint, if supplied.
    #[must_use]
    pub fn table_endpoint(&self) -> Option<&str> {
        self.table_endpoint.as_deref()
    }

    /// `DefaultEndpointsProtocol`, if supplied.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    /// Whether this addresses the local development emulator.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.development
    }

    /// Any segment not recognised above.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}

impl FromStr for ConnectionString {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// AccountKey must never reach logs.
impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &self.account_key.as_ref().map(|_| "<redacted>"))
            .field("table_endpoint", &self.table_endpoint)
            .field("protocol", &self.protocol)
            .field("development", &self.development)
            .finish()
    }
}
