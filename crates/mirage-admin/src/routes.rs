// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Route definitions for REST API and Web UI.

use crate::handlers;
use crate::AppState;
use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::RustEmbed;
use std::sync::Arc;

#[derive(RustEmbed)]
#[folder = "static/"]
struct Assets;

/// Admin API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/records",
            get(handlers::all_records)
                .post(handlers::import_records)
                .delete(handlers::delete_all_records),
        )
        .route("/count", get(handlers::records_count))
        .route("/stats", get(handlers::stats))
        .route("/statsws", get(handlers::stats_ws))
        .route(
            "/state",
            get(handlers::current_state).post(handlers::set_state),
        )
}

/// Web UI: every other path is looked up in the embedded assets.
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new().fallback(serve_static)
}

async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() || path.ends_with('/') {
        format!("{}index.html", path)
    } else {
        path.to_string()
    };
    serve_asset(&path)
}

fn serve_asset(path: &str) -> Response {
    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data,
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_index_exists() {
        assert!(Assets::get("index.html").is_some());
        assert!(Assets::get("app.js").is_some());
    }

    #[test]
    fn test_missing_asset_is_404() {
        let response = serve_asset("does/not/exist.txt");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
