//! Refresh token handles.

use time::{Duration, OffsetDateTime};

use crate::types::claims::ClaimsPrincipal;
use crate::types::token::{Token, TokenMetadata};

/// A refresh token.
///
/// Wraps the access token it was issued alongside and the principal that
/// authorized it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    /// When the refresh token was issued.
    pub creation_time: OffsetDateTime,
    /// Lifetime in seconds.
    pub lifetime: i32,
    /// The access token issued alongside.
    pub access_token: Token,
    /// The principal that authorized the grant.
    pub subject: ClaimsPrincipal,
    /// Token format version.
    pub version: i32,
}

impl RefreshToken {
    /// Creates a refresh token issued now.
    #[must_use]
    pub fn new(access_token: Token, subject: ClaimsPrincipal, lifetime: i32) -> Self {
        Self {
            creation_time: OffsetDateTime::now_utc(),
            lifetime,
            access_token,
            subject,
            version: 1,
        }
    }

    /// When the refresh token stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.creation_time + Duration::seconds(i64::from(self.lifetime))
    }

    /// Returns `true` if the refresh token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at()
    }
}

impl TokenMetadata for RefreshToken {
    fn subject_id(&self) -> Option<&str> {
        self.subject
            .subject_id()
            .or_else(|| self.access_token.subject_id())
    }

    fn client_id(&self) -> &str {
        self.access_token.client_id()
    }

    fn scopes(&self) -> Vec<String> {
        self.access_token.scopes()
    }
}
