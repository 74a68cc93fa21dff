//! Reference-resolving artifact serialization.
//!
//! Tokens are stored as JSON in which the client is reduced to
//! `{ "clientId": ... }` and every scope to `{ "name": ... }`. On read the
//! placeholders are replaced by the current client and scope definitions,
//! so edits to a client apply to already-issued tokens and a deleted client
//! makes its tokens undecodable.

pub mod records;
pub mod resolver;
pub mod serializer;

pub use records::{ClientRef, PrincipalRecord, RefreshTokenRecord, ScopeRef, TokenRecord};
pub use resolver::ReferenceResolver;
pub use serializer::{ArtifactSerializer, PersistedArtifact};
