// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record store abstraction
//!
//! Defines the trait for storage backends (SQLite, in-memory).

use thiserror::Error;

/// Bucket holding captured requests.
pub const DEFAULT_BUCKET: &str = "rqbucket";

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The bucket was never created or has been deleted.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A raw record as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// Record key (content hash of the request).
    pub key: String,

    /// Encoded payload.
    pub value: Vec<u8>,
}

/// Record store trait
///
/// Backend-agnostic bucketed key/value interface. Every call is atomic on
/// its own; callers must not assume transactional composition across calls.
///
/// # Implementations
///
/// - `SqliteStore` -- Default, durable
/// - `MemoryStore` -- Ephemeral, for tests
pub trait RecordStore: Send + Sync {
    /// Return every record in `bucket`, in iteration order.
    ///
    /// A bucket that does not exist yields an empty list.
    fn get_all(&self, bucket: &str) -> Result<Vec<StoredRecord>, StoreError>;

    /// Insert or overwrite `key` in `bucket`, creating the bucket if needed.
    fn set(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Delete `bucket` and everything in it.
    ///
    /// Returns `StoreError::BucketNotFound` when there is no such bucket.
    fn delete_bucket(&self, bucket: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_not_found_is_distinguishable() {
        let err = StoreError::BucketNotFound(DEFAULT_BUCKET.to_string());
        assert!(matches!(err, StoreError::BucketNotFound(_)));
        assert_eq!(err.to_string(), "bucket not found: rqbucket");
    }
}
