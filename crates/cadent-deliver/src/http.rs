// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP mail-API delivery provider.
//!
//! Speaks the common transactional-mail JSON shape: POST one message,
//! attachments base64-encoded, provider message id in the response. Retry
//! belongs to the chain, not to this provider.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cadent_core::types::{OutboundEmail, ProviderReceipt};
use cadent_core::{CadentError, DeliveryProvider};

/// Settings for the HTTP mail-API provider.
#[derive(Debug, Clone)]
pub struct HttpApiOptions {
    /// Full send endpoint, e.g. `https://mail.example.com/v1/send`.
    pub base_url: String,
    pub api_key: Option<String>,
    /// Sender address.
    pub from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<WireAttachment>,
}

#[derive(Serialize)]
struct WireAttachment {
    filename: String,
    content_type: String,
    content: String,
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Delivery provider for a JSON mail API.
pub struct HttpApiProvider {
    client: reqwest::Client,
    options: HttpApiOptions,
}

impl HttpApiProvider {
    pub fn new(options: HttpApiOptions) -> Result<Self, CadentError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CadentError::Delivery {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, options })
    }
}

#[async_trait]
impl DeliveryProvider for HttpApiProvider {
    fn name(&self) -> &str {
        "http-api"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<ProviderReceipt, CadentError> {
        let engine = base64::engine::general_purpose::STANDARD;
        let request = SendRequest {
            from: &self.options.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.text,
            html: email.html.as_deref(),
            attachments: email
                .attachments
                .iter()
                .map(|a| WireAttachment {
                    filename: a.filename.clone(),
                    content_type: a.content_type.clone(),
                    content: engine.encode(&a.data),
                })
                .collect(),
        };

        let mut req = self.client.post(&self.options.base_url).json(&request);
        if let Some(key) = &self.options.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| CadentError::Delivery {
            message: format!("mail API request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CadentError::Delivery {
                message: format!("mail API returned {status}: {body}"),
                source: None,
            });
        }

        let parsed: SendResponse = response.json().await.unwrap_or(SendResponse { id: None });
        debug!(message_id = ?parsed.id, "mail API accepted message");
        Ok(ProviderReceipt {
            message_id: parsed.id,
        })
    }
}
