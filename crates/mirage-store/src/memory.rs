// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory record backend.

use crate::store::{RecordStore, StoreError, StoredRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One bucket: insertion-ordered records plus a key index.
#[derive(Default)]
struct Bucket {
    records: Vec<StoredRecord>,
    index: HashMap<String, usize>,
}

/// In-memory record store
///
/// Keeps bolt-like bucket semantics: buckets appear on first write and
/// disappear on delete. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    buckets: RwLock<BTreeMap<String, Bucket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Bucket>>, StoreError> {
        self.buckets
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Bucket>>, StoreError> {
        self.buckets
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl RecordStore for MemoryStore {
    fn get_all(&self, bucket: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let buckets = self.read()?;
        Ok(buckets
            .get(bucket)
            .map(|b| b.records.clone())
            .unwrap_or_default())
    }

    fn set(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut buckets = self.write()?;
        let bucket = buckets.entry(bucket.to_string()).or_default();

        match bucket.index.get(key) {
            Some(&pos) => bucket.records[pos].value = value.to_vec(),
            None => {
                bucket.index.insert(key.to_string(), bucket.records.len());
                bucket.records.push(StoredRecord {
                    key: key.to_string(),
                    value: value.to_vec(),
                });
            }
        }

        Ok(())
    }

    fn delete_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut buckets = self.write()?;
        match buckets.remove(bucket) {
            Some(_) => Ok(()),
            None => Err(StoreError::BucketNotFound(bucket.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_BUCKET;
    use std::sync::Arc;

    #[test]
    fn test_memory_store_overwrite_keeps_position() {
        let store = MemoryStore::new();

        store.set(DEFAULT_BUCKET, "a", &[1]).unwrap();
        store.set(DEFAULT_BUCKET, "b", &[2]).unwrap();
        store.set(DEFAULT_BUCKET, "a", &[3]).unwrap();

        let records = store.get_all(DEFAULT_BUCKET).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "a");
        assert_eq!(records[0].value, vec![3]);
        assert_eq!(records[1].key, "b");
    }

    #[test]
    fn test_memory_store_delete_bucket() {
        let store = MemoryStore::new();

        assert!(matches!(
            store.delete_bucket(DEFAULT_BUCKET),
            Err(StoreError::BucketNotFound(_))
        ));

        store.set(DEFAULT_BUCKET, "a", &[1]).unwrap();
        store.delete_bucket(DEFAULT_BUCKET).unwrap();
        assert!(store.get_all(DEFAULT_BUCKET).unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_concurrent_writers() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store
                            .set(DEFAULT_BUCKET, &format!("{}-{}", t, i), &[t as u8])
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get_all(DEFAULT_BUCKET).unwrap().len(), 200);
    }
}
