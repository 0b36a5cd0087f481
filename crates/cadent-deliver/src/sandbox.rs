// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal simulation provider.
//!
//! Accepts every message without touching the network. Placed at the end
//! of the chain in non-production environments so the rest of the engine
//! (claims, status transitions, analytics) can be exercised end to end.

use async_trait::async_trait;
use tracing::info;

use cadent_core::types::{OutboundEmail, ProviderReceipt};
use cadent_core::{CadentError, DeliveryProvider};

/// Always-succeeding simulation provider.
pub struct SandboxProvider;

#[async_trait]
impl DeliveryProvider for SandboxProvider {
    fn name(&self) -> &str {
        "sandbox"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<ProviderReceipt, CadentError> {
        let message_id = format!("sandbox-{}", uuid::Uuid::new_v4());
        info!(
            to = %email.to,
            subject = %email.subject,
            attachments = email.attachments.len(),
            message_id = %message_id,
            "simulated delivery"
        );
        Ok(ProviderReceipt {
            message_id: Some(message_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sandbox_always_accepts() {
        let email = OutboundEmail {
            to: "ada@example.com".into(),
            to_name: None,
            subject: "Checking in".into(),
            text: "Hi.".into(),
            html: None,
            attachments: vec![],
        };
        let receipt = SandboxProvider.send(&email).await.unwrap();
        assert!(receipt.message_id.unwrap().starts_with("sandbox-"));
    }
}
