// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SQLite record backend
//!
//! Durable storage for captured records.

use crate::store::{RecordStore, StoreError, StoredRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// SQLite record store
///
/// Thread-safe via internal Mutex (SQLite Connection is not Sync).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE buckets (
///     name TEXT PRIMARY KEY
/// );
/// CREATE TABLE records (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     bucket TEXT NOT NULL,
///     key TEXT NOT NULL,
///     value BLOB NOT NULL,
///     UNIQUE (bucket, key)
/// );
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store with a file-based database
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| {
            StoreError::Backend(format!("failed to open SQLite database at {}: {}", path, e))
        })?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store
    pub fn new_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("connection lock poisoned".to_string()))
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS buckets (
                name TEXT PRIMARY KEY
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bucket TEXT NOT NULL,
                key TEXT NOT NULL,
                value BLOB NOT NULL,
                UNIQUE (bucket, key)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_bucket ON records(bucket)",
            [],
        )?;

        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn get_all(&self, bucket: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT key, value
             FROM records
             WHERE bucket = ?1
             ORDER BY id ASC",
        )?;

        let records = stmt
            .query_map([bucket], |row| {
                Ok(StoredRecord {
                    key: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn set(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO buckets (name) VALUES (?1)",
            params![bucket],
        )?;

        // Overwrite keeps the original row id, so iteration order is stable
        // across re-imports of the same key.
        tx.execute(
            "INSERT INTO records (bucket, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (bucket, key) DO UPDATE SET value = excluded.value",
            params![bucket, key, value],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn delete_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let exists = tx
            .query_row(
                "SELECT name FROM buckets WHERE name = ?1",
                params![bucket],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .is_some();

        if !exists {
            return Err(StoreError::BucketNotFound(bucket.to_string()));
        }

        tx.execute("DELETE FROM records WHERE bucket = ?1", params![bucket])?;
        tx.execute("DELETE FROM buckets WHERE name = ?1", params![bucket])?;
        tx.commit()?;

        Ok(())
    }
}
