// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mirage record layer
//!
//! Shared by the capture path and the admin control plane so that both key
//! recorded traffic into the same lookup space.
//!
//! # Architecture
//!
//! ```text
//! Payload (request + response)
//! +-- RequestDetails::record_key()   canonical MD5 content hash
//! +-- PayloadCodec                   canonical binary encoding (bincode)
//! +-- RecordStore                    bucketed key/value backend
//!     +-- SqliteStore                durable, default
//!     +-- MemoryStore                tests and ephemeral runs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mirage_store::{Payload, PayloadCodec, RecordStore, SqliteStore};
//!
//! let store = SqliteStore::new("mirage.db")?;
//! let codec = PayloadCodec::default();
//!
//! let bytes = codec.encode(&payload)?;
//! store.set("rqbucket", &payload.request.record_key(), &bytes)?;
//! ```

pub mod codec;
pub mod memory;
pub mod payload;
pub mod sqlite;
pub mod store;

pub use codec::{CodecError, PayloadCodec, DEFAULT_MAX_RECORD_BYTES};
pub use memory::MemoryStore;
pub use payload::{Headers, Payload, RequestDetails, ResponseDetails};
pub use sqlite::SqliteStore;
pub use store::{RecordStore, StoreError, StoredRecord, DEFAULT_BUCKET};
