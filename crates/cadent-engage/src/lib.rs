// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engagement tracking for the Cadent follow-up engine.
//!
//! Translates delivery lifecycle events (sent, opened, bounced,
//! complained) into per-client trust signals and bounce-driven
//! auto-suppression.

pub mod bounce;
pub mod tracker;

pub use bounce::classify_bounce;
pub use tracker::{EngagementTracker, EventInput};
