// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-client trust-signal state machine driven by delivery lifecycle
//! events.
//!
//! Every event is appended to the analytics log first; the client
//! mutations follow. A hard bounce or spam complaint immediately pauses
//! follow-ups and cancels the client's queued items; soft bounces pause
//! only once three have accumulated.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use cadent_core::types::{AnalyticsEvent, AnalyticsEventKind, BounceKind};
use cadent_core::CadentError;
use cadent_storage::Store;

/// Engagement score bounds and adjustments.
const SCORE_MIN: i64 = 0;
const SCORE_MAX: i64 = 100;
const SCORE_OPENED: i64 = 1;
const SCORE_CLICKED: i64 = 2;
const SCORE_HARD_BOUNCE: i64 = -20;
const SCORE_SOFT_BOUNCE: i64 = -5;
const SCORE_COMPLAINT: i64 = -30;
/// Soft bounces tolerated before follow-ups pause.
const SOFT_BOUNCE_LIMIT: u32 = 3;

/// A delivery lifecycle event to record.
#[derive(Debug, Clone)]
pub struct EventInput {
    pub owner_id: String,
    pub client_id: String,
    pub message_id: String,
    pub kind: AnalyticsEventKind,
    pub bounce_kind: Option<BounceKind>,
    pub data: Option<String>,
}

/// Records analytics events and maintains client trust signals.
#[derive(Clone)]
pub struct EngagementTracker {
    store: Store,
}

impl EngagementTracker {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Append the event and apply its client-level effects.
    pub async fn record(&self, input: EventInput) -> Result<(), CadentError> {
        let now = Utc::now();
        let event = AnalyticsEvent {
            id: Uuid::new_v4().to_string(),
            owner_id: input.owner_id.clone(),
            client_id: input.client_id.clone(),
            message_id: input.message_id.clone(),
            event: input.kind,
            bounce_kind: input.bounce_kind,
            data: input.data.clone(),
            created_at: now,
        };
        self.store.append_event(&event).await?;

        let Some(mut client) = self.store.get_client(&input.client_id).await? else {
            warn!(client_id = %input.client_id, "event for unknown client, signals not updated");
            return Ok(());
        };

        let mut cancel_queued = false;
        match input.kind {
            AnalyticsEventKind::Sent | AnalyticsEventKind::Delivered => {}
            AnalyticsEventKind::Opened => client.engagement_score += SCORE_OPENED,
            AnalyticsEventKind::Clicked => client.engagement_score += SCORE_CLICKED,
            AnalyticsEventKind::Bounced => {
                // Unclassified bounces count as hard: pausing too eagerly
                // beats mailing a dead address again.
                let kind = input.bounce_kind.unwrap_or(BounceKind::Hard);
                client.bounce_count += 1;
                client.last_bounce_at = Some(now);
                match kind {
                    BounceKind::Hard => {
                        client.engagement_score += SCORE_HARD_BOUNCE;
                        if !client.followups_paused {
                            client.followups_paused = true;
                            cancel_queued = true;
                        }
                    }
                    BounceKind::Soft => {
                        client.soft_bounce_count += 1;
                        client.engagement_score += SCORE_SOFT_BOUNCE;
                        if client.soft_bounce_count >= SOFT_BOUNCE_LIMIT {
                            client.followups_paused = true;
                        }
                    }
                }
            }
            AnalyticsEventKind::Complained => {
                client.engagement_score += SCORE_COMPLAINT;
                client.followups_paused = true;
                cancel_queued = true;
            }
        }

        client.engagement_score = client.engagement_score.clamp(SCORE_MIN, SCORE_MAX);
        self.store.save_client_signals(&client).await?;

        if cancel_queued {
            let cancelled = self
                .store
                .cancel_queued_for_client(&input.client_id)
                .await?;
            info!(
                client_id = %input.client_id,
                cancelled,
                kind = %input.kind,
                "follow-ups paused and queued items cancelled"
            );
        }
        Ok(())
    }

    /// Unsubscribe signal: independent of bounce accounting.
    pub async fn record_unsubscribe(&self, client_id: &str) -> Result<(), CadentError> {
        let Some(mut client) = self.store.get_client(client_id).await? else {
            warn!(client_id, "unsubscribe for unknown client");
            return Ok(());
        };
        client.unsubscribed = true;
        self.store.save_client_signals(&client).await?;
        let cancelled = self.store.cancel_queued_for_client(client_id).await?;
        info!(client_id, cancelled, "client unsubscribed");
        Ok(())
    }

    /// Manual reactivation: clears the pause and resets bounce accounting
    /// and the engagement score.
    pub async fn reactivate(&self, client_id: &str) -> Result<(), CadentError> {
        self.store.reactivate_client(client_id).await?;
        info!(client_id, "client reactivated");
        Ok(())
    }
}
