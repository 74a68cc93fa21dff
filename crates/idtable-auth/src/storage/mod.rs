//! Storage traits for persisted security artifacts.
//!
//! This module defines storage interfaces for:
//!
//! - Client registrations ([`ClientStore`], also the client lookup used
//!   when decoding tokens)
//! - Scope definitions ([`ScopeStore`], the scope lookup)
//! - Remembered consent ([`ConsentStore`])
//! - Refresh tokens and reference token handles ([`TransientDataStore`])
//!
//! # Implementations
//!
//! - [`memory`] - in-memory client and scope stores
//! - `idtable-auth-table` - partitioned table storage backend

pub mod client;
pub mod consent;
pub mod memory;
pub mod scope;
pub mod transient;

pub use client::ClientStore;
pub use consent::ConsentStore;
pub use memory::{InMemoryClientStore, InMemoryScopeStore};
pub use scope::ScopeStore;
pub use transient::{RefreshTokenStore, TokenHandleStore, TransientDataStore};
