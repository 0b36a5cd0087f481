// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery provider with scripted outcomes.
//!
//! Outcomes are popped from a FIFO queue; when the queue is empty the
//! provider accepts the message. This makes retry/fallback behavior in
//! the chain and the dispatcher fast and deterministic to test.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cadent_core::types::{OutboundEmail, ProviderReceipt};
use cadent_core::{CadentError, DeliveryProvider};

/// A mock delivery provider that replays pre-configured outcomes.
pub struct MockDeliveryProvider {
    name: String,
    script: Arc<Mutex<VecDeque<Result<ProviderReceipt, String>>>>,
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl MockDeliveryProvider {
    /// Create a provider that accepts everything.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider that fails its first `n` sends, then accepts.
    pub fn failing_first(name: &str, n: usize) -> Self {
        let provider = Self::new(name);
        let script = provider.script.clone();
        let mut queue = VecDeque::new();
        for i in 0..n {
            queue.push_back(Err(format!("{name} refused (scripted failure {i})")));
        }
        // Replace the queue synchronously; no task is running yet.
        *script.try_lock().expect("fresh mutex") = queue;
        provider
    }

    /// Append a scripted failure.
    pub async fn push_failure(&self, error: &str) {
        self.script.lock().await.push_back(Err(error.to_string()));
    }

    /// Append a scripted success with the given message id.
    pub async fn push_success(&self, message_id: &str) {
        self.script.lock().await.push_back(Ok(ProviderReceipt {
            message_id: Some(message_id.to_string()),
        }));
    }

    /// Messages this provider accepted, in order.
    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl DeliveryProvider for MockDeliveryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, email: &OutboundEmail) -> Result<ProviderReceipt, CadentError> {
        let scripted = self.script.lock().await.pop_front();
        match scripted {
            Some(Err(message)) => Err(CadentError::Delivery {
                message,
                source: None,
            }),
            Some(Ok(receipt)) => {
                self.sent.lock().await.push(email.clone());
                Ok(receipt)
            }
            None => {
                self.sent.lock().await.push(email.clone());
                Ok(ProviderReceipt {
                    message_id: Some(format!("{}-accepted", self.name)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutboundEmail {
        OutboundEmail {
            to: "ada@example.com".into(),
            to_name: None,
            subject: "Hello".into(),
            text: "Hi.".into(),
            html: None,
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn default_accepts_everything() {
        let provider = MockDeliveryProvider::new("mock");
        let receipt = provider.send(&email()).await.unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("mock-accepted"));
        assert_eq!(provider.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn scripted_outcomes_replay_in_order() {
        let provider = MockDeliveryProvider::new("mock");
        provider.push_failure("boom").await;
        provider.push_success("id-1").await;

        assert!(provider.send(&email()).await.is_err());
        let receipt = provider.send(&email()).await.unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("id-1"));
        // Queue exhausted: back to accepting.
        assert!(provider.send(&email()).await.is_ok());
    }

    #[tokio::test]
    async fn failing_first_fails_exactly_n_times() {
        let provider = MockDeliveryProvider::failing_first("flaky", 2);
        assert!(provider.send(&email()).await.is_err());
        assert!(provider.send(&email()).await.is_err());
        assert!(provider.send(&email()).await.is_ok());
        assert_eq!(provider.sent().await.len(), 1, "only the success lands");
    }
}
