// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. All violations are collected; validation does not fail
//! fast.

use crate::diagnostic::ConfigError;
use crate::model::CadentConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &CadentConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.engine.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.log_level must be one of {LOG_LEVELS:?}, got `{}`",
                config.engine.log_level
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.dispatch.batch_size == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.batch_size must be at least 1".to_string(),
        });
    }

    if config.dispatch.claim_lease_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.claim_lease_secs must be positive, got {}",
                config.dispatch.claim_lease_secs
            ),
        });
    }

    if config.generation.rate_limit_per_minute == 0 {
        errors.push(ConfigError::Validation {
            message: "generation.rate_limit_per_minute must be at least 1".to_string(),
        });
    }

    for (name, value) in [
        ("base_temperature", config.generation.base_temperature),
        (
            "variation_temperature",
            config.generation.variation_temperature,
        ),
    ] {
        if !(0.0..=2.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("generation.{name} must be in [0.0, 2.0], got {value}"),
            });
        }
    }

    if config.delivery.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.max_attempts must be at least 1".to_string(),
        });
    }

    if config.delivery.base_backoff_ms > config.delivery.max_backoff_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "delivery.base_backoff_ms ({}) must not exceed delivery.max_backoff_ms ({})",
                config.delivery.base_backoff_ms, config.delivery.max_backoff_ms
            ),
        });
    }

    if config.delivery.smtp_host.is_some() && config.delivery.smtp_from.is_none() {
        errors.push(ConfigError::Validation {
            message: "delivery.smtp_from is required when delivery.smtp_host is set".to_string(),
        });
    }

    if config.delivery.http_base_url.is_some() && config.delivery.http_from.is_none() {
        errors.push(ConfigError::Validation {
            message: "delivery.http_from is required when delivery.http_base_url is set"
                .to_string(),
        });
    }

    let no_real_provider =
        config.delivery.smtp_host.is_none() && config.delivery.http_base_url.is_none();
    if no_real_provider && !config.delivery.sandbox_fallback {
        errors.push(ConfigError::Validation {
            message: "delivery has no providers: configure smtp_host, http_base_url, \
                      or enable sandbox_fallback"
                .to_string(),
        });
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
