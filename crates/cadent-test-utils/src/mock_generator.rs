// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock content generator with scripted outcomes and request capture.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cadent_core::types::{GeneratedContent, GenerationRequest};
use cadent_core::{CadentError, ContentGenerator};

/// A mock content generator that replays pre-configured outcomes and
/// records every request it sees.
pub struct MockGenerator {
    script: Arc<Mutex<VecDeque<Result<GeneratedContent, String>>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockGenerator {
    /// Create a generator that returns a default follow-up for every call.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a scripted generation.
    pub async fn push_content(&self, subject: &str, body: &str) {
        self.script.lock().await.push_back(Ok(GeneratedContent {
            subject: subject.to_string(),
            body: body.to_string(),
        }));
    }

    /// Append a scripted failure.
    pub async fn push_failure(&self, error: &str) {
        self.script.lock().await.push_back(Err(error.to_string()));
    }

    /// Requests seen so far, in order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, CadentError> {
        self.requests.lock().await.push(request.clone());
        match self.script.lock().await.pop_front() {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(CadentError::Generation {
                message,
                source: None,
            }),
            None => Ok(GeneratedContent {
                subject: "Following up".into(),
                body: "Just checking in on this.".into(),
            }),
        }
    }
}
