// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical binary encoding of payloads.
//!
//! Records are stored as bincode (little-endian, varint integers) with a hard
//! size limit. Headers are ordered maps, so equal payloads always produce
//! equal bytes.

use crate::payload::Payload;
use bincode::Options;
use thiserror::Error;

/// Default upper bound for one encoded record (8 MiB).
pub const DEFAULT_MAX_RECORD_BYTES: u64 = 8 * 1024 * 1024;

/// Codec errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode payload: {0}")]
    Encode(String),

    #[error("failed to decode payload: {0}")]
    Decode(String),
}

/// Encodes and decodes payloads in the store's record format.
#[derive(Debug, Clone, Copy)]
pub struct PayloadCodec {
    max_record_bytes: u64,
}

impl Default for PayloadCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORD_BYTES)
    }
}

impl PayloadCodec {
    /// Create a codec rejecting records larger than `max_record_bytes`.
    pub fn new(max_record_bytes: u64) -> Self {
        Self { max_record_bytes }
    }

    pub fn max_record_bytes(&self) -> u64 {
        self.max_record_bytes
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_little_endian()
            .with_varint_encoding()
            .with_limit(self.max_record_bytes)
    }

    /// Encode a payload.
    pub fn encode(&self, payload: &Payload) -> Result<Vec<u8>, CodecError> {
        self.options()
            .serialize(payload)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Decode a stored record.
    pub fn decode(&self, bytes: &[u8]) -> Result<Payload, CodecError> {
        self.options()
            .deserialize(bytes)
            .map_err(|e| CodecError::Decode(e.to_string()))
    }
}
