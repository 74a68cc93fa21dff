//! OAuth 2.0 / OpenID Connect client registration.

use serde::{Deserialize, Serialize};

// =============================================================================
// Flow
// =============================================================================

/// Protocol flow a client is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// Authorization code flow.
    #[default]
    AuthorizationCode,
    /// Implicit flow.
    Implicit,
    /// Hybrid flow.
    Hybrid,
    /// Client credentials flow.
    ClientCredentials,
    /// Resource owner password credentials flow.
    ResourceOwner,
}

impl Flow {
    /// Returns the wire name of the flow.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Implicit => "implicit",
            Self::Hybrid => "hybrid",
            Self::ClientCredentials => "client_credentials",
            Self::ResourceOwner => "resource_owner",
        }
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How refresh tokens issued to a client behave on use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUsage {
    /// The same handle is returned on every refresh.
    ReUse,
    /// A new handle is issued on every refresh.
    #[default]
    OneTimeOnly,
}

// =============================================================================
// Client
// =============================================================================

/// A client registration.
///
/// Clients are persisted in full in the client table. Token rows only carry a
/// `{ clientId }` placeholder and are re-joined with this record on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in protocol flows.
    pub client_id: String,

    /// Human-readable display name.
    #[serde(default)]
    pub client_name: String,

    /// Whether the client may currently be used.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Flow the client is registered for.
    #[serde(default)]
    pub flow: Flow,

    /// Allowed redirect URIs.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Allowed post-logout redirect URIs.
    #[serde(default)]
    pub post_logout_redirect_uris: Vec<String>,

    /// Scope names the client may request. Empty means all.
    #[serde(default)]
    pub allowed_scopes: Vec<String>,

    /// Whether the consent screen is shown.
    #[serde(default = "default_true")]
    pub require_consent: bool,

    /// Whether the user may choose to remember consent.
    #[serde(default = "default_true")]
    pub allow_remember_consent: bool,

    /// Access token lifetime in seconds.
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: i32,

    /// Absolute refresh token lifetime in seconds.
    #[serde(default = "default_refresh_token_lifetime")]
    pub absolute_refresh_token_lifetime: i32,

    /// Refresh token handle behaviour.
    #[serde(default)]
    pub refresh_token_usage: TokenUsage,

    /// Origins allowed for CORS requests from browser-based clients.
    #[serde(default)]
    pub allowed_cors_origins: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_access_token_lifetime() -> i32 {
    3600
}

fn default_refresh_token_lifetime() -> i32 {
    2_592_000
}

impl Client {
    /// Creates an enabled client with default lifetimes.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_name: client_name.into(),
            enabled: true,
            flow: Flow::default(),
            redirect_uris: Vec::new(),
            post_logout_redirect_uris: Vec::new(),
            allowed_scopes: Vec::new(),
            require_consent: true,
            allow_remember_consent: true,
            access_token_lifetime: default_access_token_lifetime(),
            absolute_refresh_token_lifetime: default_refresh_token_lifetime(),
            refresh_token_usage: TokenUsage::default(),
            allowed_cors_origins: Vec::new(),
        }
    }

    /// Builder-style setter for the allowed scopes.
    #[must_use]
    pub fn with_allowed_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if the client may request `scope`.
    #[must_use]
    pub fn allows_scope(&self, scope: &str) -> bool {
        self.allowed_scopes.is_empty() || self.allowed_scopes.iter().any(|s| s == scope)
    }
}
