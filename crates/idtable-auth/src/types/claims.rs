//! Claims, identities and principals.

use serde::{Deserialize, Serialize};

use crate::serialization::PrincipalRecord;

/// Well-known claim types.
pub mod claim_types {
    /// Subject identifier.
    pub const SUBJECT: &str = "sub";
    /// Granted scope.
    pub const SCOPE: &str = "scope";
    /// Client the token was issued to.
    pub const CLIENT_ID: &str = "client_id";
    /// Authentication method reference.
    pub const AMR: &str = "amr";
    /// Identity provider.
    pub const IDP: &str = "idp";
    /// Authentication time.
    pub const AUTH_TIME: &str = "auth_time";
}

/// A single `{ type, value }` claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type, e.g. `sub`.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

impl Claim {
    /// Creates a claim.
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// A set of claims asserted by one authentication.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimsIdentity {
    /// How the identity was authenticated; `None` for anonymous identities.
    pub authentication_type: Option<String>,
    /// The asserted claims, in issue order.
    pub claims: Vec<Claim>,
}

impl ClaimsIdentity {
    /// Creates an identity.
    #[must_use]
    pub fn new(claims: Vec<Claim>, authentication_type: Option<String>) -> Self {
        Self {
            authentication_type,
            claims,
        }
    }

    /// Returns `true` when an authentication type is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authentication_type
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

/// The authenticated subject a token was issued for.
///
/// Persisted as `{ authenticationType, claims: [...] }`; on read the identity
/// wrapper is rebuilt around the decoded claim set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "PrincipalRecord", into = "PrincipalRecord")]
pub struct ClaimsPrincipal {
    /// The principal's identity.
    pub identity: ClaimsIdentity,
}

impl ClaimsPrincipal {
    /// Wraps an identity.
    #[must_use]
    pub fn new(identity: ClaimsIdentity) -> Self {
        Self { identity }
    }

    /// Convenience constructor from raw claims.
    #[must_use]
    pub fn from_claims(claims: Vec<Claim>, authentication_type: impl Into<String>) -> Self {
        Self::new(ClaimsIdentity::new(claims, Some(authentication_type.into())))
    }

    /// All claims of the principal.
    #[must_use]
    pub fn claims(&self) -> &[Claim] {
        &self.identity.claims
    }

    /// Value of the first claim of the given type.
    #[must_use]
    pub fn find_first(&self, claim_type: &str) -> Option<&str> {
        self.identity
            .claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// The `sub` claim, if any.
    #[must_use]
    pub fn subject_id(&self) -> Option<&str> {
        self.find_first(claim_types::SUBJECT)
    }
}
