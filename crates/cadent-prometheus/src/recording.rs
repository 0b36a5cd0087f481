// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use metrics::{describe_counter, describe_histogram};

/// Register all Cadent metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("cadent_dispatch_runs_total", "Dispatch invocations");
    describe_counter!(
        "cadent_items_processed_total",
        "Schedulable items processed, by kind"
    );
    describe_counter!("cadent_sends_total", "Successful sends, by provider");
    describe_counter!(
        "cadent_suppressed_total",
        "Sends suppressed before delivery, by reason"
    );
    describe_counter!("cadent_failures_total", "Item-level failures, by kind");
    describe_histogram!(
        "cadent_delivery_latency_seconds",
        "Wall-clock time spent in the delivery chain per send"
    );
}

/// Record one dispatch invocation.
pub fn record_dispatch_run() {
    metrics::counter!("cadent_dispatch_runs_total").increment(1);
}

/// Record a processed item.
pub fn record_item(kind: &str) {
    metrics::counter!("cadent_items_processed_total", "kind" => kind.to_string()).increment(1);
}

/// Record a successful send through `provider`.
pub fn record_send(provider: &str) {
    metrics::counter!("cadent_sends_total", "provider" => provider.to_string()).increment(1);
}

/// Record a suppressed send.
pub fn record_suppressed(reason: &str) {
    metrics::counter!("cadent_suppressed_total", "reason" => reason.to_string()).increment(1);
}

/// Record an item-level failure.
pub fn record_failure(kind: &str) {
    metrics::counter!("cadent_failures_total", "kind" => kind.to_string()).increment(1);
}

/// Record delivery chain latency.
pub fn record_delivery_latency(seconds: f64) {
    metrics::histogram!("cadent_delivery_latency_seconds").record(seconds);
}
