//! Store engine configuration.
//!
//! ```toml
//! connection_string = "AccountName=prod;AccountKey=..."
//!
//! [retry]
//! max_attempts = 3
//! max_elapsed = "30s"
//! interval = "200ms"
//!
//! [token_handles]
//! table_name = "TokenHandle"
//! retry = true
//!
//! [token_handles.revoke]
//! mode = "parallel"
//! completion = "awaited"
//! ```
//!
//! Every section is optional. Table sections only override what they name;
//! anything left out falls back to the artifact kind's default.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use idtable_auth::StoreError;
use idtable_storage::ConnectionString;
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

// =============================================================================
// Artifact kinds
// =============================================================================

/// The four artifact tables managed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Client registrations.
    Clients,
    /// Remembered consent.
    Consents,
    /// Refresh tokens.
    RefreshTokens,
    /// Reference access token handles.
    TokenHandles,
}

impl ArtifactKind {
    /// All kinds, in configuration order.
    pub const ALL: [ArtifactKind; 4] = [
        Self::Clients,
        Self::Consents,
        Self::RefreshTokens,
        Self::TokenHandles,
    ];

    /// Table name used when none is configured.
    #[must_use]
    pub fn default_table_name(&self) -> &'static str {
        match self {
            Self::Clients => "Clients",
            Self::Consents => "Consent",
            Self::RefreshTokens => "RefreshTokens",
            Self::TokenHandles => "TokenHandle",
        }
    }

    /// Whether backend calls on this table are retried unless configured.
    #[must_use]
    pub fn retries_by_default(&self) -> bool {
        matches!(self, Self::TokenHandles)
    }

    /// Configuration key of the kind's section.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Consents => "consents",
            Self::RefreshTokens => "refresh_tokens",
            Self::TokenHandles => "token_handles",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Retry budget shared by every table that has retry enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per backend call, including the first.
    pub max_attempts: u32,

    /// Total time budget across attempts.
    #[serde(with = "humantime_serde")]
    pub max_elapsed: Duration,

    /// Delay between attempts.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_elapsed: Duration::from_secs(30),
            interval: Duration::from_millis(200),
        }
    }
}

/// Per-table overrides for the client and consent tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSection {
    /// Table name override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// Whether backend calls are retried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,
}

/// How revocation issues its deletions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutMode {
    /// All deletions are in flight at once.
    #[default]
    Parallel,
    /// Deletions run one after another.
    Sequential,
}

/// Whether revocation waits for its deletions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutCompletion {
    /// `revoke` returns once every deletion settled, reporting the first
    /// failure.
    #[default]
    Awaited,
    /// Deletions run in a detached task; failures are only logged.
    BestEffort,
}

/// Revocation fan-out strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanOutConfig {
    /// Parallel or sequential deletions.
    pub mode: FanOutMode,
    /// Awaited or best-effort completion.
    pub completion: FanOutCompletion,
}

impl FanOutConfig {
    /// Parallel deletions, fully awaited.
    #[must_use]
    pub fn parallel_awaited() -> Self {
        Self::default()
    }

    /// Sequential deletions in a detached task.
    #[must_use]
    pub fn sequential_best_effort() -> Self {
        Self {
            mode: FanOutMode::Sequential,
            completion: FanOutCompletion::BestEffort,
        }
    }
}

/// Per-table overrides for the token tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenTableSection {
    /// Table name override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// Whether backend calls are retried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,

    /// Revocation strategy.
    pub revoke: FanOutConfig,
}

// =============================================================================
// TableStoreConfig
// =============================================================================

/// Connection string used when none is configured.
pub const DEFAULT_CONNECTION_STRING: &str = "UseDevelopmentStorage=true";

/// Configuration for the table-backed artifact stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStoreConfig {
    /// Backend connection descriptor.
    pub connection_string: String,

    /// Retry budget for tables with retry enabled.
    pub retry: RetryConfig,

    /// Client table.
    pub clients: TableSection,

    /// Consent table.
    pub consents: TableSection,

    /// Refresh token table.
    pub refresh_tokens: TokenTableSection,

    /// Token handle table.
    pub token_handles: TokenTableSection,
}

impl Default for TableStoreConfig {
    fn default() -> Self {
        Self {
            connection_string: DEFAULT_CONNECTION_STRING.to_string(),
            retry: RetryConfig::default(),
            clients: TableSection::default(),
            consents: TableSection::default(),
            refresh_tokens: TokenTableSection::default(),
            token_handles: TokenTableSection::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration sources could not be read or merged.
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl From<ConfigError> for StoreError {
    fn from(err: ConfigError) -> Self {
        StoreError::configuration(err.to_string())
    }
}

impl TableStoreConfig {
    /// Effective table name for a kind.
    #[must_use]
    pub fn table_name(&self, kind: ArtifactKind) -> &str {
        let configured = match kind {
            ArtifactKind::Clients => self.clients.table_name.as_deref(),
            ArtifactKind::Consents => self.consents.table_name.as_deref(),
            ArtifactKind::RefreshTokens => self.refresh_tokens.table_name.as_deref(),
            ArtifactKind::TokenHandles => self.token_handles.table_name.as_deref(),
        };
        configured.unwrap_or(kind.default_table_name())
    }

    /// Whether backend calls on a kind's table are retried.
    #[must_use]
    pub fn retry_enabled(&self, kind: ArtifactKind) -> bool {
        let configured = match kind {
            ArtifactKind::Clients => self.clients.retry,
            ArtifactKind::Consents => self.consents.retry,
            ArtifactKind::RefreshTokens => self.refresh_tokens.retry,
            ArtifactKind::TokenHandles => self.token_handles.retry,
        };
        configured.unwrap_or(kind.retries_by_default())
    }

    /// Effective retry policy for a kind's table.
    #[must_use]
    pub fn retry_policy(&self, kind: ArtifactKind) -> RetryPolicy {
        RetryPolicy::from_config(&self.retry, self.retry_enabled(kind))
    }

    /// Parses the connection string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the descriptor is malformed.
    pub fn connection(&self) -> Result<ConnectionString, ConfigError> {
        ConnectionString::parse(&self.connection_string)
            .map_err(|e| ConfigError::InvalidValue(format!("connection_string: {e}")))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` for an empty connection string and
    /// `ConfigError::InvalidValue` if:
    /// - the connection string does not parse
    /// - `retry.max_attempts` is zero
    /// - a table name is not 3-63 alphanumeric characters starting with a letter
    /// - two kinds share a table
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection_string.trim().is_empty() {
            return Err(ConfigError::Missing("connection_string".to_string()));
        }
        self.connection()?;

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "retry.max_attempts must be >= 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for kind in ArtifactKind::ALL {
            let name = self.table_name(kind);
            if !is_valid_table_name(name) {
                return Err(ConfigError::InvalidValue(format!(
                    "{kind}.table_name '{name}' must be 3-63 alphanumeric characters starting with a letter"
                )));
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ConfigError::InvalidValue(format!(
                    "{kind}.table_name '{name}' is used by another artifact kind"
                )));
            }
        }

        Ok(())
    }
}

/// Table names: 3-63 ASCII alphanumerics, first character a letter.
#[must_use]
pub fn is_valid_table_name(name: &str) -> bool {
    (3..=63).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric())
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

// =============================================================================
// Loader
// =============================================================================

pub mod loader {
    use std::path::Path;

    use ::config::{Config, Environment, File, Map};

    use super::{ConfigError, TableStoreConfig};

    /// Environment variable prefix, e.g. `IDTABLE__TOKEN_HANDLES__TABLE_NAME`.
    pub const ENV_PREFIX: &str = "IDTABLE";

    /// Loads configuration from an optional TOML file and the process
    /// environment, then validates it.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_config(path: Option<&Path>) -> Result<TableStoreConfig, ConfigError> {
        load_config_with_env(path, None)
    }

    /// Like [`load_config`], reading environment overrides from `env` instead
    /// of the process environment when given.
    pub fn load_config_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<TableStoreConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(p) = path
            && p.exists()
        {
            builder = builder.add_source(File::from(p));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__")
                .source(env),
        );

        let cfg = builder
            .build()
            .map_err(|e| ConfigError::Load(format!("config build error: {e}")))?;
        let merged: TableStoreConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("config deserialize error: {e}")))?;

        merged.validate()?;
        tracing::debug!(
            clients = merged.table_name(super::ArtifactKind::Clients),
            consents = merged.table_name(super::ArtifactKind::Consents),
            refresh_tokens = merged.table_name(super::ArtifactKind::RefreshTokens),
            token_handles = merged.table_name(super::ArtifactKind::TokenHandles),
            "Loaded table store configuration"
        );
        Ok(merged)
    }
}
