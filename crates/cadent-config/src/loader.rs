// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./cadent.toml` > `~/.config/cadent/cadent.toml`
//! > `/etc/cadent/cadent.toml`, with environment variable overrides via
//! the `CADENT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CadentConfig;

/// Load configuration from the standard XDG hierarchy with env var
/// overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/cadent/cadent.toml` (system-wide)
/// 3. `~/.config/cadent/cadent.toml` (user XDG config)
/// 4. `./cadent.toml` (local directory)
/// 5. `CADENT_*` environment variables
pub fn load_config() -> Result<CadentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CadentConfig::default()))
        .merge(Toml::file("/etc/cadent/cadent.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("cadent/cadent.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("cadent.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config injection.
pub fn load_config_from_str(toml_content: &str) -> Result<CadentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CadentConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CadentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CadentConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity
/// with underscore-containing key names: `CADENT_DELIVERY_SMTP_HOST`
/// must map to `delivery.smtp_host`, not `delivery.smtp.host`.
fn env_provider() -> Env {
    Env::prefixed("CADENT_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("dispatch_", "dispatch.", 1)
            .replacen("generation_", "generation.", 1)
            .replacen("delivery_", "delivery.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
