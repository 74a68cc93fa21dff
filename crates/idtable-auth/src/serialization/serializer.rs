//! JSON encoding of artifacts with reference placeholders.
//!
//! Decoding runs in two phases: serde parses the payload into the artifact's
//! record type, then [`PersistedArtifact::from_record`] resolves every
//! placeholder through the [`ReferenceResolver`]. A payload therefore never
//! decodes into a token whose client or scopes are missing.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::StoreResult;
use crate::error::StoreError;
use crate::serialization::records::{ClientRef, RefreshTokenRecord, ScopeRef, TokenRecord};
use crate::serialization::resolver::ReferenceResolver;
use crate::types::{RefreshToken, Token};

// =============================================================================
// PersistedArtifact
// =============================================================================

/// An artifact with a persisted JSON form.
#[async_trait]
pub trait PersistedArtifact: Sized + Send + Sync {
    /// The serde shape written to the `Json` column.
    type Record: Serialize + DeserializeOwned + Send + 'static;

    /// Replaces embedded clients and scopes with placeholders.
    fn to_record(&self) -> Self::Record;

    /// Rebuilds the artifact, resolving placeholders.
    async fn from_record(record: Self::Record, resolver: &ReferenceResolver) -> StoreResult<Self>;
}

#[async_trait]
impl PersistedArtifact for Token {
    type Record = TokenRecord;

    fn to_record(&self) -> TokenRecord {
        TokenRecord {
            audience: self.audience.clone(),
            issuer: self.issuer.clone(),
            creation_time: self.creation_time,
            lifetime: self.lifetime,
            token_type: self.token_type.clone(),
            client: ClientRef {
                client_id: self.client.client_id.clone(),
            },
            claims: self.claims.clone(),
            scopes: self
                .scopes
                .iter()
                .map(|s| ScopeRef {
                    name: s.name.clone(),
                })
                .collect(),
            version: self.version,
        }
    }

    async fn from_record(record: TokenRecord, resolver: &ReferenceResolver) -> StoreResult<Self> {
        let client = resolver.resolve_client(&record.client).await?;
        let scopes = resolver.resolve_scopes(&record.scopes).await?;

        Ok(Self {
            audience: record.audience,
            issuer: record.issuer,
            creation_time: record.creation_time,
            lifetime: record.lifetime,
            token_type: record.token_type,
            client,
            claims: record.claims,
            scopes,
            version: record.version,
        })
    }
}

#[async_trait]
impl PersistedArtifact for RefreshToken {
    type Record = RefreshTokenRecord;

    fn to_record(&self) -> RefreshTokenRecord {
        RefreshTokenRecord {
            creation_time: self.creation_time,
            lifetime: self.lifetime,
            access_token: self.access_token.to_record(),
            subject: self.subject.clone(),
            version: self.version,
        }
    }

    async fn from_record(
        record: RefreshTokenRecord,
        resolver: &ReferenceResolver,
    ) -> StoreResult<Self> {
        let access_token = Token::from_record(record.access_token, resolver).await?;

        Ok(Self {
            creation_time: record.creation_time,
            lifetime: record.lifetime,
            access_token,
            subject: record.subject,
            version: record.version,
        })
    }
}

// =============================================================================
// ArtifactSerializer
// =============================================================================

/// Encodes artifacts to JSON and decodes them back, resolving references.
#[derive(Debug, Clone)]
pub struct ArtifactSerializer {
    resolver: ReferenceResolver,
}

impl ArtifactSerializer {
    /// Creates a serializer that resolves references through `resolver`.
    #[must_use]
    pub fn new(resolver: ReferenceResolver) -> Self {
        Self { resolver }
    }

    /// The resolver used on decode.
    #[must_use]
    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// Encodes an artifact.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if serde rejects the record.
    pub fn to_json<T: PersistedArtifact>(&self, value: &T) -> StoreResult<String> {
        serde_json::to_string(&value.to_record())
            .map_err(|e| StoreError::serialization(e.to_string()))
    }

    /// Decodes an artifact, resolving its client and scope placeholders.
    ///
    /// # Errors
    ///
    /// - `StoreError::MalformedPayload` if the JSON does not fit the record shape
    /// - `StoreError::ReferenceNotFound` / `AmbiguousReference` from resolution
    /// - any error raised by the injected lookups
    pub async fn from_json<T: PersistedArtifact>(&self, json: &str) -> StoreResult<T> {
        let record: T::Record =
            serde_json::from_str(json).map_err(|e| StoreError::malformed_payload(e.to_string()))?;
        T::from_record(record, &self.resolver).await
    }
}
