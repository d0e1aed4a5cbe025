// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime mode state machine.
//!
//! The proxy runs in exactly one [`Mode`] at a time. Every mode may follow
//! every other mode; the only invalid transitions are to values outside the
//! enumeration. The mode is read on every proxied request, so it lives in a
//! lock-free atomic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;

/// Operating mode of the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Mode {
    /// Serve recorded responses.
    Virtualize = 0,
    /// Forward traffic and record it.
    Capture = 1,
    /// Forward traffic through middleware.
    Modify = 2,
    /// Generate responses with middleware.
    Synthesize = 3,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::Virtualize,
        Mode::Capture,
        Mode::Modify,
        Mode::Synthesize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Virtualize => "virtualize",
            Mode::Capture => "capture",
            Mode::Modify => "modify",
            Mode::Synthesize => "synthesize",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Mode::Virtualize,
            1 => Mode::Capture,
            2 => Mode::Modify,
            3 => Mode::Synthesize,
            // Only `Mode as u8` is ever stored.
            other => {
                debug_assert!(false, "invalid mode byte {}", other);
                Mode::Synthesize
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = StateError;

    /// Case-sensitive: "Capture" is not a mode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| StateError::InvalidMode(s.to_string()))
    }
}

/// State machine errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("Bad mode supplied, available modes: virtualize, capture, modify, synthesize.")]
    InvalidMode(String),
}

/// Externally visible control state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateView {
    pub mode: Mode,
    pub destination: String,
}

/// Shared control state: current mode plus the fixed destination.
///
/// Passed explicitly to every consumer (admin handlers, proxy path) instead
/// of living in a global.
#[derive(Debug)]
pub struct ControlState {
    mode: AtomicU8,
    destination: String,
}

impl ControlState {
    pub fn new(mode: Mode, destination: impl Into<String>) -> Self {
        Self {
            mode: AtomicU8::new(mode as u8),
            destination: destination.into(),
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.mode.load(Ordering::Acquire))
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Current mode and destination.
    pub fn get_state(&self) -> StateView {
        StateView {
            mode: self.mode(),
            destination: self.destination.clone(),
        }
    }

    /// Validate `requested` and make it the current mode.
    ///
    /// On error the state is untouched. On success the returned view is read
    /// back after the write, so a racing writer may already be visible.
    pub fn set_state(&self, requested: &str) -> Result<StateView, StateError> {
        let mode: Mode = requested.parse()?;
        self.set_mode(mode);
        Ok(self.get_state())
    }

    pub fn set_mode(&self, mode: Mode) {
        self.mode.store(mode as u8, Ordering::Release);
    }

    /// Switch to `new` only if the current mode is still `expected`.
    ///
    /// Returns the previous mode on success and the actual mode on failure.
    pub fn compare_and_set(&self, expected: Mode, new: Mode) -> Result<Mode, Mode> {
        self.mode
            .compare_exchange(
                expected as u8,
                new as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(Mode::from_u8)
            .map_err(Mode::from_u8)
    }
}
