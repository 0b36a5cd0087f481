// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP trigger surface for the Cadent follow-up engine.
//!
//! An external scheduler (cron or equivalent) POSTs to the dispatch
//! endpoints; the gateway runs the dispatcher and answers with a
//! structured summary. Health and metrics are served unauthenticated.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{build_router, serve, start_server, AppState, ServerConfig};
