//! Remembered user consent.

use serde::{Deserialize, Serialize};

/// A subject's remembered consent for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    /// The consenting subject.
    pub subject: String,
    /// The client consent was granted to.
    pub client_id: String,
    /// Granted scope names, in grant order.
    pub scopes: Vec<String>,
}

impl Consent {
    /// Creates a consent record.
    #[must_use]
    pub fn new<I, S>(subject: impl Into<String>, client_id: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            client_id: client_id.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if every requested scope was granted.
    #[must_use]
    pub fn covers<S: AsRef<str>>(&self, requested: &[S]) -> bool {
        requested
            .iter()
            .all(|r| self.scopes.iter().any(|s| s == r.as_ref()))
    }
}
