// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Routes:
//! - `GET /health`, `GET /metrics` -- public.
//! - `POST /v1/dispatch` -- the external scheduler's trigger; bearer auth
//!   is mounted only when a token is configured, so a token-less
//!   deployment can still be driven by its cron.
//! - `POST /v1/dispatch/queue` -- always requires the bearer token
//!   (fail-closed when none is configured).

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use cadent_core::CadentError;
use cadent_dispatch::Dispatcher;
use cadent_storage::Store;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Store,
    pub auth: AuthConfig,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Assemble the full router.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .with_state(state.clone());

    let dispatch_routes = {
        let routes = Router::new().route("/v1/dispatch", post(handlers::post_dispatch));
        let routes = if state.auth.bearer_token.is_some() {
            routes.route_layer(axum_middleware::from_fn_with_state(
                state.auth.clone(),
                auth_middleware,
            ))
        } else {
            routes
        };
        routes.with_state(state.clone())
    };

    let queue_routes = Router::new()
        .route("/v1/dispatch/queue", post(handlers::post_dispatch_queue))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(dispatch_routes)
        .merge(queue_routes)
        .layer(CorsLayer::permissive())
}

/// Serve the router on an already-bound listener.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: AppState,
) -> Result<(), CadentError> {
    let app = build_router(state);
    axum::serve(listener, app)
        .await
        .map_err(|e| CadentError::Internal(format!("gateway server error: {e}")))
}

/// Bind and serve the gateway.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), CadentError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CadentError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;
    info!("gateway listening on {addr}");
    serve(listener, state).await
}
