// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the trigger endpoints.
//!
//! The dispatch endpoints always answer 200 with a structured summary
//! even when individual items fail, so an external scheduler never
//! mistakes partial failure for total failure. Only a dispatcher-level
//! error (e.g. the store is unreachable) yields a 5xx.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use cadent_dispatch::{DispatchSummary, ItemResult};

use crate::server::AppState;

/// Response body for the dispatch endpoints.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub message: String,
    pub processed: u32,
    pub sent: u32,
    pub suppressed: u32,
    pub failed: u32,
    pub results: Vec<ItemResult>,
}

impl DispatchResponse {
    fn from_summary(summary: DispatchSummary, message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            processed: summary.processed,
            sent: summary.sent,
            suppressed: summary.suppressed,
            failed: summary.failed,
            results: summary.results,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /v1/dispatch
///
/// Runs one dispatch cycle over due one-shot messages and campaigns.
pub async fn post_dispatch(State(state): State<AppState>) -> Response {
    match state.dispatcher.run_once().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(DispatchResponse::from_summary(summary, "dispatch complete")),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "dispatch cycle failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /v1/dispatch/queue
///
/// Authenticated sibling: runs the regular cycle plus the followup queue.
pub async fn post_dispatch_queue(State(state): State<AppState>) -> Response {
    let mut summary = match state.dispatcher.run_once().await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "dispatch cycle failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    match state.dispatcher.run_queue().await {
        Ok(queue_summary) => summary.merge(queue_summary),
        Err(e) => {
            error!(error = %e, "queue cycle failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    }

    (
        StatusCode::OK,
        Json(DispatchResponse::from_summary(
            summary,
            "dispatch and queue complete",
        )),
    )
        .into_response()
}

/// GET /health (public)
pub async fn get_public_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.store.health_check().await {
        Ok(()) => "ok",
        Err(_) => "degraded",
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics (public)
pub async fn get_public_metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus_render {
        Some(render) => (StatusCode::OK, render()).into_response(),
        None => (StatusCode::OK, String::new()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_response_serializes_counts() {
        let response = DispatchResponse {
            success: true,
            message: "dispatch complete".into(),
            processed: 2,
            sent: 1,
            suppressed: 1,
            failed: 0,
            results: vec![],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"processed\":2"));
        assert!(json.contains("\"results\":[]"));
    }

    #[test]
    fn error_response_serializes() {
        let response = ErrorResponse {
            success: false,
            error: "storage error: disk gone".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("disk gone"));
    }
}
