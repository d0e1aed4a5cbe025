// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-mode traffic counters.

use crate::state::Mode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the counters, keyed by mode name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub counters: BTreeMap<String, u64>,
}

impl StatsSnapshot {
    pub fn get(&self, mode: Mode) -> u64 {
        self.counters.get(mode.as_str()).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counters.values().sum()
    }
}

/// Request counters, one per mode.
#[derive(Debug, Default)]
pub struct Counter {
    counters: [AtomicU64; 4],
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request handled in `mode`.
    pub fn count(&self, mode: Mode) {
        self.counters[mode as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// Take the current counts and reset them to zero.
    ///
    /// Each counter is swapped atomically, so concurrent flushes never report
    /// the same increment twice and no increment is lost.
    pub fn flush(&self) -> StatsSnapshot {
        let counters = Mode::ALL
            .into_iter()
            .map(|mode| {
                let value = self.counters[mode as usize].swap(0, Ordering::AcqRel);
                (mode.as_str().to_string(), value)
            })
            .collect();

        StatsSnapshot { counters }
    }
}
