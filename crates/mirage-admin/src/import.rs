// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record import pipeline.
//!
//! Turns externally supplied payloads into store entries keyed exactly like
//! the capture path keys live traffic, so imported fixtures are replayable.
//! Each payload is processed on its own: one bad record is skipped and the
//! rest of the batch still lands.

use mirage_store::{Payload, PayloadCodec, RecordStore};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Import errors that reject the whole batch.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Bad request. Nothing to import!")]
    NothingToImport,
}

/// A payload that was not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Position of the payload in the submitted batch.
    pub index: usize,
    pub reason: String,
}

/// Outcome of one import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub attempted: usize,
    pub imported: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportSummary {
    pub fn message(&self) -> String {
        format!("{} requests imported successfully", self.attempted)
    }
}

/// Encode, key and upsert every payload into `bucket`.
pub fn import<S: RecordStore + ?Sized>(
    store: &S,
    codec: &PayloadCodec,
    bucket: &str,
    payloads: &[Payload],
) -> Result<ImportSummary, ImportError> {
    if payloads.is_empty() {
        return Err(ImportError::NothingToImport);
    }

    let mut summary = ImportSummary {
        attempted: payloads.len(),
        ..Default::default()
    };

    for (index, payload) in payloads.iter().enumerate() {
        let bytes = match codec.encode(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(index, error = %e, "Failed to encode payload");
                summary.skipped.push(SkippedRecord {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let key = payload.record_key();
        if let Err(e) = store.set(bucket, &key, &bytes) {
            error!(index, key = %key, error = %e, "Failed to store payload");
            summary.skipped.push(SkippedRecord {
                index,
                reason: e.to_string(),
            });
            continue;
        }

        debug!(index, key = %key, "Imported payload");
        summary.imported += 1;
    }

    Ok(summary)
}
