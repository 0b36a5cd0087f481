// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content generator trait for the generation-service boundary.

use async_trait::async_trait;

use crate::error::CadentError;
use crate::types::{GeneratedContent, GenerationRequest};

/// Produces subject/body text for a campaign send.
///
/// Implementations must reject over-limit callers with
/// [`CadentError::RateLimited`] before any upstream call, and must never
/// return placeholder content in place of a failed generation.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, CadentError>;
}
