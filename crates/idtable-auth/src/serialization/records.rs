//! Persisted JSON shapes.
//!
//! Token payloads never embed full clients or scopes. They carry
//! reference placeholders that [`ReferenceResolver`](super::ReferenceResolver)
//! turns back into full objects on read.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{Claim, ClaimsIdentity, ClaimsPrincipal};

/// `{ "clientId": ... }` placeholder for a [`Client`](crate::types::Client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    /// Identifier of the referenced client.
    pub client_id: String,
}

/// `{ "name": ... }` placeholder for a [`Scope`](crate::types::Scope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRef {
    /// Name of the referenced scope.
    pub name: String,
}

/// Flat `{ authenticationType, claims }` form of a [`ClaimsPrincipal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalRecord {
    /// Authentication type of the principal's identity.
    #[serde(default)]
    pub authentication_type: Option<String>,
    /// The identity's claims.
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl From<PrincipalRecord> for ClaimsPrincipal {
    fn from(record: PrincipalRecord) -> Self {
        ClaimsPrincipal::new(ClaimsIdentity::new(
            record.claims,
            record.authentication_type,
        ))
    }
}

impl From<ClaimsPrincipal> for PrincipalRecord {
    fn from(principal: ClaimsPrincipal) -> Self {
        Self {
            authentication_type: principal.identity.authentication_type,
            claims: principal.identity.claims,
        }
    }
}

/// Persisted form of a [`Token`](crate::types::Token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Intended audience.
    #[serde(default)]
    pub audience: String,
    /// Issuer URI.
    #[serde(default)]
    pub issuer: String,
    /// Issue time.
    #[serde(with = "time::serde::rfc3339")]
    pub creation_time: OffsetDateTime,
    /// Lifetime in seconds.
    pub lifetime: i32,
    /// Token type.
    #[serde(rename = "type")]
    pub token_type: String,
    /// The client placeholder.
    pub client: ClientRef,
    /// Claims carried by the token.
    #[serde(default)]
    pub claims: Vec<Claim>,
    /// Scope placeholders.
    #[serde(default)]
    pub scopes: Vec<ScopeRef>,
    /// Token format version.
    #[serde(default = "default_version")]
    pub version: i32,
}

/// Persisted form of a [`RefreshToken`](crate::types::RefreshToken).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    /// Issue time.
    #[serde(with = "time::serde::rfc3339")]
    pub creation_time: OffsetDateTime,
    /// Lifetime in seconds.
    pub lifetime: i32,
    /// The access token issued alongside.
    pub access_token: TokenRecord,
    /// The authorizing principal.
    #[serde(default)]
    pub subject: ClaimsPrincipal,
    /// Token format version.
    #[serde(default = "default_version")]
    pub version: i32,
}

fn default_version() -> i32 {
    1
}
