// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP request handlers for the admin API.

use crate::import::{self, ImportError, SkippedRecord};
use crate::records::{self, RecordsError};
use crate::state::StateError;
use crate::stream::{StatsResponse, StatsStreamer};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ws::WebSocket, State, WebSocketUpgrade},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use mirage_store::Payload;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = MessageResponse {
            message: self.message,
        };
        match serde_json::to_vec(&body) {
            Ok(json) => (
                self.status,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
                .into_response(),
            Err(_) => self.status.into_response(),
        }
    }
}

impl From<StateError> for ApiError {
    fn from(err: StateError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<RecordsError> for ApiError {
    fn from(err: RecordsError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Something went wrong: {}", err))
    }
}

/// `{"message": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `{"data": [...]}`, both directions.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordsEnvelope {
    #[serde(default)]
    pub data: Option<Vec<Payload>>,
}

#[derive(Debug, Serialize)]
struct CountResponse {
    count: usize,
}

#[derive(Debug, Serialize)]
struct ImportResponse {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<SkippedRecord>,
}

/// Body of `POST /state`. Destination is accepted but read-only.
#[derive(Debug, Deserialize)]
struct StateRequest {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    destination: Option<String>,
}

/// Serialize `value` as a JSON response; a marshal failure becomes a 500.
fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response, ApiError> {
    let json = serde_json::to_vec(value).map_err(|e| {
        error!(error = %e, "Failed to marshal response");
        ApiError::internal(e.to_string())
    })?;

    Ok((status, [(header::CONTENT_TYPE, "application/json")], json).into_response())
}

/// GET /records
pub async fn all_records(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let store = Arc::clone(&state.store);
    let codec = state.codec;
    let bucket = state.bucket.clone();

    let payloads = tokio::task::spawn_blocking(move || records::list_all(&*store, &codec, &bucket))
        .await?
        .map_err(|e| {
            error!(error = %e, "Failed to get data from cache!");
            e
        })?;

    json_response(
        StatusCode::OK,
        &RecordsEnvelope {
            data: Some(payloads),
        },
    )
}

/// GET /count
pub async fn records_count(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let store = Arc::clone(&state.store);
    let codec = state.codec;
    let bucket = state.bucket.clone();

    let count = tokio::task::spawn_blocking(move || records::count(&*store, &codec, &bucket))
        .await?
        .map_err(|e| {
            error!(error = %e, "Failed to get data from cache!");
            e
        })?;

    json_response(StatusCode::OK, &CountResponse { count })
}

/// POST /records
pub async fn import_records(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(|e| {
        error!(error = %e, "Could not read request body!");
        ApiError::bad_request("Failed to read request body.")
    })?;

    if body.is_empty() {
        return Err(ImportError::NothingToImport.into());
    }

    let envelope: RecordsEnvelope = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Rejecting import body");
        ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Invalid JSON: {}", e),
        )
    })?;
    let payloads = envelope.data.unwrap_or_default();

    let store = Arc::clone(&state.store);
    let codec = state.codec;
    let bucket = state.bucket.clone();

    let summary = tokio::task::spawn_blocking(move || {
        import::import(&*store, &codec, &bucket, &payloads)
    })
    .await??;

    info!(
        attempted = summary.attempted,
        imported = summary.imported,
        skipped = summary.skipped.len(),
        "Import finished"
    );

    json_response(
        StatusCode::OK,
        &ImportResponse {
            message: summary.message(),
            skipped: summary.skipped,
        },
    )
}

/// DELETE /records
pub async fn delete_all_records(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let store = Arc::clone(&state.store);
    let bucket = state.bucket.clone();

    let outcome = tokio::task::spawn_blocking(move || records::delete_all(&*store, &bucket))
        .await?
        .map_err(|e| {
            error!(error = %e, "Failed to delete records");
            e
        })?;

    info!(outcome = ?outcome, "Delete all records");
    json_response(
        StatusCode::OK,
        &MessageResponse {
            message: outcome.message().to_string(),
        },
    )
}

/// GET /stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let response = StatsResponse {
        stats: state.counter.flush(),
    };
    json_response(StatusCode::OK, &response)
}

/// GET /statsws
pub async fn stats_ws(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| stream_stats(socket, state))
}

async fn stream_stats(socket: WebSocket, state: Arc<AppState>) {
    let (tx, rx) = socket.split();

    let streamer = StatsStreamer::new(Arc::clone(&state.counter), state.stats_interval);
    let session_id = streamer.session_id().to_string();

    let outcome = streamer.run(tx, rx).await;
    info!(
        "[{}] Stats stream ended after {} frames: {:?}",
        session_id, outcome.frames_sent, outcome.end
    );
}

/// GET /state
pub async fn current_state(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    json_response(StatusCode::OK, &state.control.get_state())
}

/// POST /state
pub async fn set_state(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(|e| {
        error!(error = %e, "Could not read request body!");
        ApiError::bad_request("Failed to read request body.")
    })?;

    let request: StateRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;
    let requested = request.mode.unwrap_or_default();

    if let Some(destination) = request
        .destination
        .filter(|d| !d.is_empty() && d != state.control.destination())
    {
        debug!(destination = %destination, "Ignoring destination change, it is read-only");
    }

    info!(
        new_state = %requested,
        body = %String::from_utf8_lossy(&body),
        "Handling state change request!"
    );

    let view = state.control.set_state(&requested).map_err(|e| {
        error!(supplied_mode = %requested, "Wrong mode found, can't change state");
        ApiError::from(e)
    })?;

    json_response(StatusCode::OK, &view)
}
