// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the content-generation service.
//!
//! Handles request construction, authentication, and transient error
//! retry. The generation service is a request/response boundary: it takes
//! tone, context strings, and prior-message summaries, and returns a
//! subject and body.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use cadent_core::types::GeneratedContent;
use cadent_core::CadentError;

use crate::prompt::GenerationPayload;

/// HTTP client for the generation service.
///
/// Retries once on transient statuses (429, 500, 503, 529) after a short
/// delay; every other non-success status fails the call.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl GenerationClient {
    /// Creates a new generation client.
    ///
    /// `timeout` bounds each upstream call so a slow generation cannot
    /// stall a whole dispatch invocation.
    pub fn new(
        base_url: String,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, CadentError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| CadentError::Config(format!("invalid generation API key: {e}")))?;
            headers.insert("authorization", value);
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CadentError::Generation {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            max_retries: 1,
        })
    }

    /// Request one subject/body generation.
    pub async fn complete(
        &self,
        payload: &GenerationPayload,
    ) -> Result<GeneratedContent, CadentError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying generation request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(payload)
                .send()
                .await
                .map_err(|e| CadentError::Generation {
                    message: format!("generation request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "generation response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| CadentError::Generation {
                    message: format!("failed to read generation response: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let content: GeneratedContent =
                    serde_json::from_str(&body).map_err(|e| CadentError::Generation {
                        message: format!("malformed generation response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(content);
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient generation error, will retry");
                last_error = Some(CadentError::Generation {
                    message: format!("generation service returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            return Err(CadentError::Generation {
                message: format!("generation service returned {status}: {body}"),
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| CadentError::Generation {
            message: "generation request failed after retries".into(),
            source: None,
        }))
    }
}

/// Returns true for HTTP status codes worth one retry.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> GenerationClient {
        GenerationClient::new(
            format!("{base_url}/v1/generate"),
            Some("test-key"),
            Duration::from_secs(10),
        )
        .unwrap()
    }

    fn test_payload() -> GenerationPayload {
        GenerationPayload {
            tone: "friendly".into(),
            client_context: "Ada, invoice #42".into(),
            business_context: "Design studio".into(),
            prior_messages: vec![],
            instructions: vec!["Write a short follow-up email.".into()],
            temperature: 0.7,
            max_tokens: 1024,
        }
    }

    #[tokio::test]
    async fn complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subject": "Quick check-in",
                "body": "Hi Ada, just following up on invoice #42."
            })))
            .mount(&server)
            .await;

        let content = test_client(&server.uri())
            .complete(&test_payload())
            .await
            .unwrap();
        assert_eq!(content.subject, "Quick check-in");
        assert!(content.body.contains("invoice #42"));
    }

    #[tokio::test]
    async fn complete_retries_on_429_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subject": "After retry",
                "body": "Body after retry."
            })))
            .mount(&server)
            .await;

        let content = test_client(&server.uri())
            .complete(&test_payload())
            .await
            .unwrap();
        assert_eq!(content.subject, "After retry");
    }

    #[tokio::test]
    async fn complete_fails_fast_on_400() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad tone"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete(&test_payload())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("400"), "got: {err}");
    }

    #[tokio::test]
    async fn complete_exhausts_retries_on_503() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(2)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete(&test_payload())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"), "got: {err}");
        assert!(
            !err.is_rate_limited(),
            "upstream transient errors are not local rate limits"
        );
    }

    #[tokio::test]
    async fn malformed_response_is_a_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete(&test_payload())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("malformed"), "got: {err}");
    }
}
