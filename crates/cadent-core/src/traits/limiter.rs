// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-rate limiting seam.

/// Per-key request throttle.
///
/// The default implementation is an in-process sliding window; deployments
/// running more than one dispatcher instance swap in a shared-store
/// implementation without touching call sites.
pub trait RateLimiter: Send + Sync {
    /// Returns true if the caller identified by `key` may proceed, and
    /// records the request against the key's window.
    fn allow(&self, key: &str) -> bool;
}
