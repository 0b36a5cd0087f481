// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cadent follow-up engine.
//!
//! This crate provides the domain entities, error type, and the trait
//! seams toward external collaborators (delivery transports, the
//! content-generation service, rate limiting, document rendering). All
//! other workspace crates build on these definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::CadentError;
pub use traits::{ContentGenerator, DeliveryProvider, DocumentRenderer, NoopRenderer, RateLimiter};
pub use types::{
    AnalyticsEvent, AnalyticsEventKind, Attachment, BounceKind, CampaignMessage, CampaignStatus,
    Client, DeliveryOutcome, FollowupQueueItem, GeneratedContent, GenerationRequest, Invoice,
    InvoiceStatus, MessageStatus, OutboundEmail, ProviderReceipt, QueueItemStatus,
    RecurrenceRule, RecurrenceType, RecurringCampaign, ScheduledMessage,
};
