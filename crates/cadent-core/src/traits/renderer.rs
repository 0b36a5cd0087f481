// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invoice document rendering seam.
//!
//! Document rendering itself lives outside this engine. The dispatcher
//! only needs a way to ask for an attachment and to tolerate not getting
//! one: a rendering failure is logged and the send proceeds without it.

use async_trait::async_trait;

use crate::error::CadentError;
use crate::types::{Attachment, Invoice};

/// Renders an invoice into an attachable document.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Returns `Ok(None)` when rendering is disabled for this deployment.
    async fn render_invoice(
        &self,
        invoice: &Invoice,
    ) -> Result<Option<Attachment>, CadentError>;
}

/// Renderer used when no document pipeline is configured.
pub struct NoopRenderer;

#[async_trait]
impl DocumentRenderer for NoopRenderer {
    async fn render_invoice(
        &self,
        _invoice: &Invoice,
    ) -> Result<Option<Attachment>, CadentError> {
        Ok(None)
    }
}
