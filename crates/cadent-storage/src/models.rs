// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `cadent-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within
//! the storage crate.

pub use cadent_core::types::{
    AnalyticsEvent, AnalyticsEventKind, BounceKind, CampaignMessage, CampaignStatus, Client,
    FollowupQueueItem, Invoice, InvoiceStatus, MessageStatus, QueueItemStatus, RecurrenceRule,
    RecurringCampaign, ScheduledMessage,
};
