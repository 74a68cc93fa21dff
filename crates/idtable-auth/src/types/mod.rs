//! Domain types for persisted security artifacts.

pub mod claims;
pub mod client;
pub mod consent;
pub mod refresh_token;
pub mod scope;
pub mod token;

pub use claims::{Claim, ClaimsIdentity, ClaimsPrincipal, claim_types};
pub use client::{Client, Flow, TokenUsage};
pub use consent::Consent;
pub use refresh_token::RefreshToken;
pub use scope::{Scope, ScopeClaim, ScopeType};
pub use token::{ACCESS_TOKEN_TYPE, Token, TokenMetadata};
