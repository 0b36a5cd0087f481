// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cadent follow-up engine.

use thiserror::Error;

/// The primary error type used across all Cadent crates.
#[derive(Debug, Error)]
pub enum CadentError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Delivery provider errors (SMTP failure, mail API rejection, bad address).
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Content generation errors (upstream failure, malformed or empty output).
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The per-owner generation rate limit was exceeded. Raised before any
    /// upstream call is attempted; callers treat this as a generation
    /// failure for the current cycle and retry on the next one.
    #[error("rate limited: {key}")]
    RateLimited { key: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CadentError {
    /// Returns true if this error is a rate-limit rejection.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_distinguishable() {
        let err = CadentError::RateLimited {
            key: "owner-1".into(),
        };
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("owner-1"));

        let other = CadentError::Generation {
            message: "empty body".into(),
            source: None,
        };
        assert!(!other.is_rate_limited());
    }

    #[test]
    fn storage_error_carries_source() {
        let err = CadentError::Storage {
            source: Box::new(std::io::Error::other("disk gone")),
        };
        assert!(err.to_string().contains("disk gone"));
    }
}
