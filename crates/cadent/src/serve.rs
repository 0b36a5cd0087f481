// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadent serve` and `cadent dispatch` command implementations.
//!
//! Wires the configured store, content generator, delivery chain,
//! engagement tracker, and dispatcher together, then either hosts the
//! gateway or runs a single cycle from the CLI.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use cadent_compose::{Composer, GenerationClient, SlidingWindowLimiter};
use cadent_config::model::{CadentConfig, DeliveryConfig, GenerationConfig};
use cadent_core::types::{GeneratedContent, GenerationRequest};
use cadent_core::{CadentError, ContentGenerator, DeliveryProvider, NoopRenderer};
use cadent_deliver::{
    DeliveryChain, HttpApiOptions, HttpApiProvider, RetryPolicy, SandboxProvider, SmtpOptions,
    SmtpProvider,
};
use cadent_dispatch::{DispatchConfig, Dispatcher};
use cadent_engage::EngagementTracker;
use cadent_gateway::{AppState, AuthConfig, ServerConfig};
use cadent_storage::Store;

/// Generator used when no generation service is configured: campaigns
/// fail their cycle with a clear error instead of sending fabricated
/// content.
struct DisabledGenerator;

#[async_trait]
impl ContentGenerator for DisabledGenerator {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GeneratedContent, CadentError> {
        Err(CadentError::Generation {
            message: "content generation is not configured (set generation.base_url)".into(),
            source: None,
        })
    }
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_generator(config: &GenerationConfig) -> Result<Arc<dyn ContentGenerator>, CadentError> {
    if config.base_url.trim().is_empty() {
        warn!("generation.base_url unset; campaign content generation disabled");
        return Ok(Arc::new(DisabledGenerator));
    }
    let client = GenerationClient::new(
        config.base_url.clone(),
        config.api_key.as_deref(),
        Duration::from_secs(config.timeout_secs),
    )?;
    let limiter = Arc::new(SlidingWindowLimiter::per_minute(
        config.rate_limit_per_minute,
    ));
    Ok(Arc::new(Composer::new(
        client,
        limiter,
        config.base_temperature,
        config.variation_temperature,
        config.max_tokens,
    )))
}

fn build_chain(config: &DeliveryConfig) -> Result<DeliveryChain, CadentError> {
    let mut providers: Vec<Box<dyn DeliveryProvider>> = Vec::new();

    if let (Some(host), Some(from)) = (&config.smtp_host, &config.smtp_from) {
        providers.push(Box::new(SmtpProvider::new(&SmtpOptions {
            host: host.clone(),
            port: config.smtp_port,
            username: config.smtp_username.clone(),
            password: config.smtp_password.clone(),
            from: from.clone(),
        })?));
    }

    if let (Some(base_url), Some(from)) = (&config.http_base_url, &config.http_from) {
        providers.push(Box::new(HttpApiProvider::new(HttpApiOptions {
            base_url: base_url.clone(),
            api_key: config.http_api_key.clone(),
            from: from.clone(),
        })?));
    }

    if config.sandbox_fallback {
        providers.push(Box::new(SandboxProvider));
    }

    info!(providers = providers.len(), "delivery chain assembled");
    Ok(DeliveryChain::new(
        providers,
        RetryPolicy {
            max_attempts: config.max_attempts,
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
        },
    ))
}

async fn build_dispatcher(config: &CadentConfig) -> Result<(Store, Arc<Dispatcher>), CadentError> {
    let store = Store::open(&config.storage.database_path).await?;
    let generator = build_generator(&config.generation)?;
    let chain = Arc::new(build_chain(&config.delivery)?);
    let tracker = EngagementTracker::new(store.clone());

    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        generator,
        chain,
        tracker,
        Arc::new(NoopRenderer),
        DispatchConfig {
            batch_size: config.dispatch.batch_size,
            claim_lease_secs: config.dispatch.claim_lease_secs,
            generation_timeout: Duration::from_secs(config.generation.timeout_secs),
            history_limit: config.dispatch.history_limit,
        },
    ));
    Ok((store, dispatcher))
}

/// Run the `cadent serve` command: host the trigger endpoints until
/// interrupted.
pub async fn run_serve(config: CadentConfig) -> Result<(), CadentError> {
    init_tracing(&config.engine.log_level);
    info!("starting cadent serve");

    let (store, dispatcher) = build_dispatcher(&config).await?;

    let prometheus_render = cadent_prometheus::install().map(|handle| {
        let render: Arc<dyn Fn() -> String + Send + Sync> = Arc::new(move || handle.render());
        render
    });

    let state = AppState {
        dispatcher,
        store: store.clone(),
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        start_time: std::time::Instant::now(),
        prometheus_render,
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    tokio::select! {
        result = cadent_gateway::start_server(&server_config, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            store.close().await
        }
    }
}

/// Run the `cadent dispatch` command: one full cycle (messages,
/// campaigns, and the followup queue), summary printed as JSON.
pub async fn run_dispatch(config: CadentConfig) -> Result<(), CadentError> {
    init_tracing(&config.engine.log_level);

    let (store, dispatcher) = build_dispatcher(&config).await?;
    let mut summary = dispatcher.run_once().await?;
    summary.merge(dispatcher.run_queue().await?);

    let rendered = serde_json::to_string_pretty(&summary)
        .map_err(|e| CadentError::Internal(format!("failed to render summary: {e}")))?;
    println!("{rendered}");

    store.close().await
}

/// Print the effective configuration with secrets redacted.
pub fn print_config(config: &CadentConfig) {
    let mut redacted = config.clone();
    redact(&mut redacted.generation.api_key);
    redact(&mut redacted.delivery.smtp_password);
    redact(&mut redacted.delivery.http_api_key);
    redact(&mut redacted.gateway.bearer_token);

    match toml::to_string_pretty(&redacted) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("error: failed to render config: {e}"),
    }
}

fn redact(secret: &mut Option<String>) {
    if secret.is_some() {
        *secret = Some("[redacted]".to_string());
    }
}
