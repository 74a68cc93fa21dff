//! Partition key derivation for artifact rows.
//!
//! Token and client rows are spread over 65 536 partitions named by the first
//! two bytes of the SHA-256 digest of the logical key, hex encoded. The row key
//! is always the full logical key, so two keys that share a bucket still map
//! to distinct rows.
//!
//! Consent rows do not use this; they are partitioned by subject.

use sha2::{Digest, Sha256};

/// Number of hex characters in a derived partition key.
pub const PARTITION_KEY_LEN: usize = 4;

/// Derives the partition key for a logical key.
///
/// Pure and stable across processes and platforms.
#[must_use]
pub fn partition_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..PARTITION_KEY_LEN / 2])
}
