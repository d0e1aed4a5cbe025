// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record queries and bulk deletion.

use mirage_store::{Payload, PayloadCodec, RecordStore, StoreError};
use thiserror::Error;
use tracing::warn;

/// Record query errors.
#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("Something went wrong: {0}")]
    Store(#[from] StoreError),
}

/// Result of a delete-all request. Both variants are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NothingToDelete,
}

impl DeleteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted => "Proxy cache deleted successfully",
            DeleteOutcome::NothingToDelete => "No records found",
        }
    }
}

/// Every payload in `bucket`, in store iteration order.
///
/// Entries that no longer decode are logged and left out.
pub fn list_all<S: RecordStore + ?Sized>(
    store: &S,
    codec: &PayloadCodec,
    bucket: &str,
) -> Result<Vec<Payload>, RecordsError> {
    let records = store.get_all(bucket)?;

    Ok(records
        .into_iter()
        .filter_map(|record| match codec.decode(&record.value) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(key = %record.key, error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect())
}

/// Number of records, by full scan.
pub fn count<S: RecordStore + ?Sized>(
    store: &S,
    codec: &PayloadCodec,
    bucket: &str,
) -> Result<usize, RecordsError> {
    Ok(list_all(store, codec, bucket)?.len())
}

/// Drop the whole bucket. A missing bucket is not an error.
pub fn delete_all<S: RecordStore + ?Sized>(
    store: &S,
    bucket: &str,
) -> Result<DeleteOutcome, RecordsError> {
    match store.delete_bucket(bucket) {
        Ok(()) => Ok(DeleteOutcome::Deleted),
        Err(StoreError::BucketNotFound(_)) => Ok(DeleteOutcome::NothingToDelete),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirage_store::{MemoryStore, RequestDetails, SqliteStore, StoredRecord};

    const BUCKET: &str = "rqbucket";

    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn get_all(&self, _bucket: &str) -> Result<Vec<StoredRecord>, StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }

        fn set(&self, _bucket: &str, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }

        fn delete_bucket(&self, _bucket: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }
    }

    fn store_payload<S: RecordStore>(store: &S, codec: &PayloadCodec, path: &str) -> Payload {
        let payload = Payload {
            request: RequestDetails {
                method: "GET".to_string(),
                path: path.to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let bytes = codec.encode(&payload).unwrap();
        store.set(BUCKET, &payload.record_key(), &bytes).unwrap();
        payload
    }

    #[test]
    fn test_list_all_and_count() {
        let store = SqliteStore::new_in_memory().unwrap();
        let codec = PayloadCodec::default();

        assert!(list_all(&store, &codec, BUCKET).unwrap().is_empty());
        assert_eq!(count(&store, &codec, BUCKET).unwrap(), 0);

        let a = store_payload(&store, &codec, "/a");
        let b = store_payload(&store, &codec, "/b");

        assert_eq!(list_all(&store, &codec, BUCKET).unwrap(), vec![a, b]);
        assert_eq!(count(&store, &codec, BUCKET).unwrap(), 2);
    }

    #[test]
    fn test_list_all_skips_undecodable_entries() {
        let store = MemoryStore::new();
        let codec = PayloadCodec::default();

        let a = store_payload(&store, &codec, "/a");
        store.set(BUCKET, "garbage", &[0xFF, 0xFF]).unwrap();

        assert_eq!(list_all(&store, &codec, BUCKET).unwrap(), vec![a]);
    }

    #[test]
    fn test_delete_all_twice() {
        let store = MemoryStore::new();
        let codec = PayloadCodec::default();
        store_payload(&store, &codec, "/a");

        assert_eq!(delete_all(&store, BUCKET).unwrap(), DeleteOutcome::Deleted);
        assert_eq!(
            delete_all(&store, BUCKET).unwrap(),
            DeleteOutcome::NothingToDelete
        );
        assert_eq!(DeleteOutcome::NothingToDelete.message(), "No records found");
    }

    #[test]
    fn test_backend_errors_propagate() {
        let codec = PayloadCodec::default();

        assert!(list_all(&BrokenStore, &codec, BUCKET).is_err());
        assert!(count(&BrokenStore, &codec, BUCKET).is_err());

        let err = delete_all(&BrokenStore, BUCKET).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Something went wrong: storage backend error: disk on fire"
        );
    }
}
