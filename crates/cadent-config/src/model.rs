// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Cadent follow-up engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Cadent configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CadentConfig {
    /// Engine-wide settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dispatch loop settings.
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Content-generation service settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Delivery provider chain settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Gateway HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Engine-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cadent").join("cadent.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("cadent.db"))
        .to_string_lossy()
        .into_owned()
}

/// Dispatch loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchSettings {
    /// Bounded batch size per item kind per invocation.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Claim lease in seconds; stale `sending` rows older than this are
    /// reclaimed by a later invocation.
    #[serde(default = "default_claim_lease_secs")]
    pub claim_lease_secs: i64,

    /// How many campaign history records feed variation instructions.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            claim_lease_secs: default_claim_lease_secs(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_batch_size() -> u32 {
    25
}

fn default_claim_lease_secs() -> i64 {
    300
}

fn default_history_limit() -> u32 {
    5
}

/// Content-generation service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Full generation endpoint URL. Empty disables campaign dispatch.
    #[serde(default)]
    pub base_url: String,

    /// Bearer token for the generation service. `None` sends no auth.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-call timeout in seconds.
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,

    /// Per-owner request budget per 60-second sliding window.
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: usize,

    /// Sampling temperature for the first message of a campaign.
    #[serde(default = "default_base_temperature")]
    pub base_temperature: f32,

    /// Sampling temperature once a campaign has prior messages.
    #[serde(default = "default_variation_temperature")]
    pub variation_temperature: f32,

    /// Maximum tokens per generated message.
    #[serde(default = "default_generation_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            timeout_secs: default_generation_timeout_secs(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            base_temperature: default_base_temperature(),
            variation_temperature: default_variation_temperature(),
            max_tokens: default_generation_max_tokens(),
        }
    }
}

fn default_generation_timeout_secs() -> u64 {
    10
}

fn default_rate_limit_per_minute() -> usize {
    10
}

fn default_base_temperature() -> f32 {
    0.7
}

fn default_variation_temperature() -> f32 {
    0.9
}

fn default_generation_max_tokens() -> u32 {
    1024
}

/// Delivery provider chain configuration.
///
/// Providers are mounted in order: SMTP (when `smtp_host` is set), then
/// the HTTP mail API (when `http_base_url` is set), then the sandbox
/// simulation provider (when `sandbox_fallback` is true).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Attempts per provider before falling through to the next.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First retry backoff in milliseconds; doubles per attempt.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Backoff ceiling in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Hard timeout per send attempt in seconds.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Mount the terminal sandbox provider at the end of the chain.
    #[serde(default = "default_sandbox_fallback")]
    pub sandbox_fallback: bool,

    /// SMTP relay host. `None` disables the SMTP provider.
    #[serde(default)]
    pub smtp_host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Sender for SMTP sends, e.g. `"Cadent <followups@example.com>"`.
    #[serde(default)]
    pub smtp_from: Option<String>,

    /// Mail API send endpoint. `None` disables the HTTP provider.
    #[serde(default)]
    pub http_base_url: Option<String>,

    #[serde(default)]
    pub http_api_key: Option<String>,

    /// Sender address for mail API sends.
    #[serde(default)]
    pub http_from: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            sandbox_fallback: default_sandbox_fallback(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            smtp_from: None,
            http_base_url: None,
            http_api_key: None,
            http_from: None,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_attempt_timeout_secs() -> u64 {
    8
}

fn default_sandbox_fallback() -> bool {
    true
}

fn default_smtp_port() -> u16 {
    587
}

/// Gateway HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for the authenticated dispatch endpoints. When unset,
    /// `/v1/dispatch` is open and `/v1/dispatch/queue` rejects everything.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8640
}
