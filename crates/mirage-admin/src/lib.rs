// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mirage Admin - control plane of the traffic-simulation proxy
//!
//! Lets an operator inspect and mutate recorded request/response pairs,
//! watch live traffic statistics and switch the proxy mode at runtime.
//!
//! # Architecture
//!
//! ```text
//! Admin API (axum)
//! +-- ControlState     mode state machine + fixed destination
//! +-- Counter          per-mode request counters, flush-and-reset
//! +-- StatsStreamer    one per /statsws observer
//! +-- import / records record pipeline over a RecordStore
//! ```
//!
//! # Endpoints
//!
//! - `GET /records` - All recorded payloads
//! - `POST /records` - Import payloads
//! - `DELETE /records` - Drop every record
//! - `GET /count` - Number of records
//! - `GET /stats` - Flush and return counters
//! - `GET /statsws` - WebSocket, counters pushed once per interval
//! - `GET /state`, `POST /state` - Current mode / switch mode
//! - anything else - embedded Web UI

pub mod config;
pub mod handlers;
pub mod import;
pub mod records;
pub mod routes;
pub mod state;
pub mod stats;
pub mod stream;

pub use config::{AdminConfig, ConfigError};
pub use import::{ImportError, ImportSummary, SkippedRecord};
pub use records::{DeleteOutcome, RecordsError};
pub use state::{ControlState, Mode, StateError, StateView};
pub use stats::{Counter, StatsSnapshot};
pub use stream::{StatsStreamer, StreamEnd, StreamOutcome};

use axum::Router;
use mirage_store::{PayloadCodec, RecordStore};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state
pub struct AppState {
    pub control: Arc<ControlState>,
    pub counter: Arc<Counter>,
    pub store: Arc<dyn RecordStore>,
    pub codec: PayloadCodec,
    pub bucket: String,
    pub stats_interval: Duration,
}

impl AppState {
    /// Build state from configuration around an already opened store.
    ///
    /// The control state and counter are fresh; use [`AppState::with_shared`]
    /// when the proxy path already owns them.
    pub fn new(config: &AdminConfig, store: Arc<dyn RecordStore>) -> Self {
        Self::with_shared(
            config,
            store,
            Arc::new(ControlState::new(config.mode, config.destination.clone())),
            Arc::new(Counter::new()),
        )
    }

    pub fn with_shared(
        config: &AdminConfig,
        store: Arc<dyn RecordStore>,
        control: Arc<ControlState>,
        counter: Arc<Counter>,
    ) -> Self {
        Self {
            control,
            counter,
            store,
            codec: PayloadCodec::new(config.max_record_bytes),
            bucket: config.bucket.clone(),
            stats_interval: config.stats_interval(),
        }
    }
}

/// Admin router with CORS and access logging.
pub fn build_router(state: Arc<AppState>, api_only: bool) -> Router {
    let mut router = Router::new().merge(routes::api_routes());

    if !api_only {
        router = router.merge(routes::ui_routes());
    }

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
