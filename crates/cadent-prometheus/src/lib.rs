// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for the Cadent follow-up engine.
//!
//! Installs a `metrics-exporter-prometheus` recorder and exposes a render
//! handle for the gateway's `/metrics` endpoint.

pub mod recording;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return the render handle.
///
/// Returns `None` when a recorder is already installed (e.g. in tests
/// running several components in one process).
pub fn install() -> Option<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder().ok()?;
    recording::register_metrics();
    Some(handle)
}
