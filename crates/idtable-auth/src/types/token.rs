//! Access token handles.

use time::{Duration, OffsetDateTime};

use crate::types::claims::{Claim, claim_types};
use crate::types::{Client, Scope};

/// Token type of a reference (handle) access token.
pub const ACCESS_TOKEN_TYPE: &str = "access_token";

/// The columns a token row is indexed by.
///
/// Stores derive the denormalized `SubjectId` / `ClientId` columns from this
/// on every write, so filters and payload can never disagree.
pub trait TokenMetadata {
    /// Subject the token was issued for, if any.
    fn subject_id(&self) -> Option<&str>;

    /// Client the token was issued to.
    fn client_id(&self) -> &str;

    /// Names of the granted scopes.
    fn scopes(&self) -> Vec<String>;
}

/// A reference access token.
///
/// The embedded [`Client`] and [`Scope`]s are only persisted as identifiers
/// and are re-fetched from their own stores on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Intended audience.
    pub audience: String,
    /// Issuer URI.
    pub issuer: String,
    /// When the token was issued.
    pub creation_time: OffsetDateTime,
    /// Lifetime in seconds.
    pub lifetime: i32,
    /// Token type, normally [`ACCESS_TOKEN_TYPE`].
    pub token_type: String,
    /// The client the token was issued to.
    pub client: Client,
    /// Claims carried by the token.
    pub claims: Vec<Claim>,
    /// Scopes granted to the token.
    pub scopes: Vec<Scope>,
    /// Token format version.
    pub version: i32,
}

impl Token {
    /// Creates an access token issued now.
    #[must_use]
    pub fn new(client: Client, claims: Vec<Claim>, scopes: Vec<Scope>, lifetime: i32) -> Self {
        Self {
            audience: String::new(),
            issuer: String::new(),
            creation_time: OffsetDateTime::now_utc(),
            lifetime,
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            client,
            claims,
            scopes,
            version: 1,
        }
    }

    /// Value of the first claim of the given type.
    #[must_use]
    pub fn find_claim(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// When the token stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.creation_time + Duration::seconds(i64::from(self.lifetime))
    }

    /// Returns `true` if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at()
    }
}

impl TokenMetadata for Token {
    fn subject_id(&self) -> Option<&str> {
        self.find_claim(claim_types::SUBJECT)
    }

    fn client_id(&self) -> &str {
        &self.client.client_id
    }

    fn scopes(&self) -> Vec<String> {
        self.scopes.iter().map(|s| s.name.clone()).collect()
    }
}
