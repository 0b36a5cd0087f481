// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ordered provider chain.
//!
//! Each provider gets a bounded number of attempts with exponential
//! backoff before the chain advances to the next one. The first accepted
//! send wins; if every provider/attempt combination fails, the last error
//! is surfaced. The chain is stateless -- persisting the `sent` status is
//! the dispatcher's job.

use std::time::Duration;

use tracing::{info, warn};

use cadent_core::types::{DeliveryOutcome, OutboundEmail};
use cadent_core::{CadentError, DeliveryProvider};

/// Retry and timeout policy applied per provider.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per provider before falling through to the next one.
    pub max_attempts: u32,
    /// First backoff delay; doubles each attempt.
    pub base_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
    /// Hard timeout per send attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            attempt_timeout: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff before `attempt` (1-indexed; the first attempt
    /// has no delay): `base * 2^(attempt - 2)`, capped at `max_backoff`.
    pub fn backoff_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(20);
        let delay = self.base_backoff.saturating_mul(1u32 << exponent);
        delay.min(self.max_backoff)
    }
}

/// Ordered chain of delivery providers with per-provider retry.
pub struct DeliveryChain {
    providers: Vec<Box<dyn DeliveryProvider>>,
    policy: RetryPolicy,
}

impl DeliveryChain {
    pub fn new(providers: Vec<Box<dyn DeliveryProvider>>, policy: RetryPolicy) -> Self {
        Self { providers, policy }
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Send `email` through the chain.
    pub async fn send(&self, email: &OutboundEmail) -> Result<DeliveryOutcome, CadentError> {
        let mut last_error: Option<CadentError> = None;
        let mut total_attempts = 0u32;

        for (index, provider) in self.providers.iter().enumerate() {
            for attempt in 1..=self.policy.max_attempts {
                let backoff = self.policy.backoff_before(attempt);
                if !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
                total_attempts += 1;

                match tokio::time::timeout(self.policy.attempt_timeout, provider.send(email))
                    .await
                {
                    Ok(Ok(receipt)) => {
                        if index > 0 {
                            info!(
                                provider = provider.name(),
                                fallback_index = index,
                                "delivery fell back from the primary provider"
                            );
                        }
                        return Ok(DeliveryOutcome {
                            provider_used: provider.name().to_string(),
                            message_id: receipt.message_id,
                            attempts: total_attempts,
                        });
                    }
                    Ok(Err(e)) => {
                        warn!(
                            provider = provider.name(),
                            attempt,
                            error = %e,
                            "delivery attempt failed"
                        );
                        last_error = Some(e);
                    }
                    Err(_) => {
                        warn!(
                            provider = provider.name(),
                            attempt,
                            timeout = ?self.policy.attempt_timeout,
                            "delivery attempt timed out"
                        );
                        last_error = Some(CadentError::Timeout {
                            duration: self.policy.attempt_timeout,
                        });
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CadentError::Delivery {
            message: "no delivery providers configured".into(),
            source: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cadent_core::types::ProviderReceipt;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Fails the first `failures` sends, then succeeds.
    struct FlakyProvider {
        name: &'static str,
        failures: u32,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl DeliveryProvider for FlakyProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn send(&self, _email: &OutboundEmail) -> Result<ProviderReceipt, CadentError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(CadentError::Delivery {
                    message: format!("{} refused (call {call})", self.name),
                    source: None,
                });
            }
            Ok(ProviderReceipt {
                message_id: Some(format!("{}-ok", self.name)),
            })
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
            attempt_timeout: Duration::from_secs(1),
        }
    }

    fn email() -> OutboundEmail {
        OutboundEmail {
            to: "ada@example.com".into(),
            to_name: Some("Ada".into()),
            subject: "Checking in".into(),
            text: "Hi Ada.".into(),
            html: None,
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn primary_success_uses_first_provider() {
        let chain = DeliveryChain::new(
            vec![
                Box::new(FlakyProvider {
                    name: "primary",
                    failures: 0,
                    calls: Arc::new(AtomicU32::new(0)),
                }),
                Box::new(FlakyProvider {
                    name: "fallback",
                    failures: 0,
                    calls: Arc::new(AtomicU32::new(0)),
                }),
            ],
            fast_policy(),
        );

        let outcome = chain.send(&email()).await.unwrap();
        assert_eq!(outcome.provider_used, "primary");
        assert_eq!(outcome.attempts, 1);
    }

    #[tokio::test]
    async fn retries_within_provider_before_falling_back() {
        let primary_calls = Arc::new(AtomicU32::new(0));
        let chain = DeliveryChain::new(
            vec![
                Box::new(FlakyProvider {
                    name: "primary",
                    failures: 1,
                    calls: primary_calls.clone(),
                }),
                Box::new(FlakyProvider {
                    name: "fallback",
                    failures: 0,
                    calls: Arc::new(AtomicU32::new(0)),
                }),
            ],
            fast_policy(),
        );

        let outcome = chain.send(&email()).await.unwrap();
        // One failure, then the retry on the same provider succeeds.
        assert_eq!(outcome.provider_used, "primary");
        assert_eq!(outcome.attempts, 2);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausted_primary_falls_back() {
        let primary_calls = Arc::new(AtomicU32::new(0));
        let chain = DeliveryChain::new(
            vec![
                Box::new(FlakyProvider {
                    name: "primary",
                    failures: 99,
                    calls: primary_calls.clone(),
                }),
                Box::new(FlakyProvider {
                    name: "fallback",
                    failures: 0,
                    calls: Arc::new(AtomicU32::new(0)),
                }),
            ],
            fast_policy(),
        );

        let outcome = chain.send(&email()).await.unwrap();
        assert_eq!(outcome.provider_used, "fallback");
        assert_eq!(outcome.attempts, 3);
        assert_eq!(
            primary_calls.load(Ordering::SeqCst),
            2,
            "primary used its full attempt budget"
        );
    }

    #[tokio::test]
    async fn all_providers_exhausted_surfaces_last_error() {
        let chain = DeliveryChain::new(
            vec![Box::new(FlakyProvider {
                name: "only",
                failures: 99,
                calls: Arc::new(AtomicU32::new(0)),
            })],
            fast_policy(),
        );

        let err = chain.send(&email()).await.unwrap_err();
        assert!(err.to_string().contains("only refused"), "got: {err}");
    }

    #[tokio::test]
    async fn empty_chain_is_an_error() {
        let chain = DeliveryChain::new(vec![], fast_policy());
        let err = chain.send(&email()).await.unwrap_err();
        assert!(err.to_string().contains("no delivery providers"), "got: {err}");
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(500),
            attempt_timeout: Duration::from_secs(1),
        };
        assert_eq!(policy.backoff_before(1), Duration::ZERO);
        assert_eq!(policy.backoff_before(2), Duration::from_millis(100));
        assert_eq!(policy.backoff_before(3), Duration::from_millis(200));
        assert_eq!(policy.backoff_before(4), Duration::from_millis(400));
        assert_eq!(policy.backoff_before(5), Duration::from_millis(500));
        assert_eq!(policy.backoff_before(9), Duration::from_millis(500));
    }
}
