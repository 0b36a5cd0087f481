// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`ContentGenerator`] implementation: rate limit, build the
//! payload, call the service, validate the output.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use cadent_core::types::{GeneratedContent, GenerationRequest};
use cadent_core::{CadentError, ContentGenerator, RateLimiter};

use crate::client::GenerationClient;
use crate::prompt;

/// Composes follow-up content through the generation service.
pub struct Composer {
    client: GenerationClient,
    limiter: Arc<dyn RateLimiter>,
    base_temperature: f32,
    variation_temperature: f32,
    max_tokens: u32,
}

impl Composer {
    pub fn new(
        client: GenerationClient,
        limiter: Arc<dyn RateLimiter>,
        base_temperature: f32,
        variation_temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            limiter,
            base_temperature,
            variation_temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl ContentGenerator for Composer {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, CadentError> {
        // The limiter runs before anything leaves the process; a rejected
        // call never reaches the generation service.
        if !self.limiter.allow(&request.owner_id) {
            return Err(CadentError::RateLimited {
                key: request.owner_id.clone(),
            });
        }

        let temperature = prompt::temperature_for(
            request.prior_messages.len(),
            self.base_temperature,
            self.variation_temperature,
        );
        let payload = prompt::build_payload(request, temperature, self.max_tokens);
        debug!(
            owner_id = %request.owner_id,
            prior = request.prior_messages.len(),
            temperature,
            "requesting generation"
        );

        let content = self.client.complete(&payload).await?;

        // Never hand back fabricated placeholders: empty output is a
        // generation failure for this cycle.
        if content.subject.trim().is_empty() || content.body.trim().is_empty() {
            return Err(CadentError::Generation {
                message: "generation service returned an empty subject or body".into(),
                source: None,
            });
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::SlidingWindowLimiter;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn composer(base_url: &str, limit: usize) -> Composer {
        let client = GenerationClient::new(
            format!("{base_url}/v1/generate"),
            None,
            Duration::from_secs(10),
        )
        .unwrap();
        Composer::new(
            client,
            Arc::new(SlidingWindowLimiter::per_minute(limit)),
            0.7,
            0.9,
            1024,
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            owner_id: "owner-1".into(),
            client_context: "Ada, invoice #42".into(),
            business_context: "Design studio".into(),
            prior_messages: vec![],
            requested_tone: "friendly".into(),
            attempt_index: 0,
        }
    }

    #[tokio::test]
    async fn generates_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subject": "Quick check-in",
                "body": "Hi Ada."
            })))
            .mount(&server)
            .await;

        let content = composer(&server.uri(), 10)
            .generate(&request())
            .await
            .unwrap();
        assert_eq!(content.subject, "Quick check-in");
    }

    #[tokio::test]
    async fn rate_limit_rejects_before_any_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subject": "S",
                "body": "B"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let composer = composer(&server.uri(), 1);
        composer.generate(&request()).await.unwrap();

        let err = composer.generate(&request()).await.unwrap_err();
        assert!(err.is_rate_limited(), "got: {err}");
        // The mock's expect(1) verifies the second call never left the process.
    }

    #[tokio::test]
    async fn empty_output_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subject": "   ",
                "body": "Hi Ada."
            })))
            .mount(&server)
            .await;

        let err = composer(&server.uri(), 10)
            .generate(&request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty subject or body"), "got: {err}");
    }
}
