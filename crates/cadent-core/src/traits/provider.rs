// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery provider trait for outbound email transports (SMTP, mail APIs).

use async_trait::async_trait;

use crate::error::CadentError;
use crate::types::{OutboundEmail, ProviderReceipt};

/// One link in the delivery chain. Providers are stateless senders; the
/// chain owns retry and fallback policy, and the dispatcher owns status
/// persistence.
#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    /// Short provider name reported in delivery outcomes (e.g. "smtp").
    fn name(&self) -> &str;

    /// Attempt to hand the message to the underlying transport.
    async fn send(&self, email: &OutboundEmail) -> Result<ProviderReceipt, CadentError>;
}
