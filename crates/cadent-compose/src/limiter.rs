// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process sliding-window rate limiter.
//!
//! Default [`RateLimiter`] implementation for single-instance deployments.
//! Multi-instance deployments swap in a shared-store implementation behind
//! the same trait; nothing here is reachable as ambient global state.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use cadent_core::RateLimiter;

/// Sliding-window limiter: at most `max_requests` per key within `window`.
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    requests: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Convenience constructor for the common per-minute configuration.
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let window = requests.entry(key.to_string()).or_default();

        while window
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            window.pop_front();
        }

        if window.len() >= self.max_requests {
            return false;
        }
        window.push_back(now);
        true
    }
}
