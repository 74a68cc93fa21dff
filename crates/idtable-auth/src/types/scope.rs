//! Scope definitions.

use serde::{Deserialize, Serialize};

/// Whether a scope grants identity data or API access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    /// OpenID Connect identity scope.
    Identity,
    /// API resource scope.
    #[default]
    Resource,
}

/// A claim emitted when a scope is granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeClaim {
    /// Claim type.
    pub name: String,
    /// Description shown on the consent screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the claim is always placed in the identity token.
    #[serde(default)]
    pub always_include_in_id_token: bool,
}

/// A scope definition.
///
/// Scope names must not contain commas: consent rows store granted scope
/// names as one comma-joined column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Unique scope name.
    pub name: String,

    /// Display name shown on the consent screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Description shown on the consent screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Identity or resource scope.
    #[serde(default, rename = "type")]
    pub scope_type: ScopeType,

    /// Whether the scope may currently be requested.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether the user may deselect the scope on the consent screen.
    #[serde(default)]
    pub required: bool,

    /// Whether the consent screen emphasises the scope.
    #[serde(default)]
    pub emphasize: bool,

    /// Whether the scope is listed in the discovery document.
    #[serde(default = "default_true")]
    pub show_in_discovery_document: bool,

    /// Claims emitted when the scope is granted.
    #[serde(default)]
    pub claims: Vec<ScopeClaim>,
}

fn default_true() -> bool {
    true
}

impl Scope {
    /// Creates an enabled resource scope.
    #[must_use]
    pub fn resource(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            scope_type: ScopeType::Resource,
            enabled: true,
            required: false,
            emphasize: false,
            show_in_discovery_document: true,
            claims: Vec::new(),
        }
    }

    /// Creates an enabled identity scope.
    #[must_use]
    pub fn identity(name: impl Into<String>) -> Self {
        Self {
            scope_type: ScopeType::Identity,
            ..Self::resource(name)
        }
    }

    /// Builder-style setter for the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}
