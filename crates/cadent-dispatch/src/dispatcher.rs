// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dispatch loop.
//!
//! Invoked by an external trigger with no input. Each invocation
//! discovers due items, claims each one with a conditional update before
//! touching it, re-runs suppression, generates content for campaigns,
//! hands the message to the delivery chain, and persists the resulting
//! transition. Item failures are isolated: one bad item never aborts the
//! batch.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use cadent_core::types::{
    AnalyticsEventKind, CampaignMessage, Client, DeliveryOutcome, FollowupQueueItem,
    GenerationRequest, Invoice, OutboundEmail, QueueItemStatus, RecurrenceType,
    RecurringCampaign, ScheduledMessage,
};
use cadent_core::{CadentError, ContentGenerator, DocumentRenderer};
use cadent_deliver::DeliveryChain;
use cadent_engage::{classify_bounce, EngagementTracker, EventInput};
use cadent_prometheus::recording;
use cadent_schedule::{evaluate, next_run, SuppressionDecision, SuppressionInputs};
use cadent_storage::Store;

use crate::item::{DispatchSummary, ItemKind, ItemOutcome, ItemResult};

/// Tunables for one dispatch invocation.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Bounded batch size per item kind per invocation.
    pub batch_size: u32,
    /// Claim lease: a `sending` row older than this is considered
    /// abandoned and becomes claimable again.
    pub claim_lease_secs: i64,
    /// Hard timeout around one content generation call.
    pub generation_timeout: std::time::Duration,
    /// How many history records feed the variation instructions.
    pub history_limit: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            claim_lease_secs: 300,
            generation_timeout: std::time::Duration::from_secs(10),
            history_limit: 5,
        }
    }
}

/// The orchestrating job: stateless per invocation, safe to run from
/// several triggers concurrently thanks to the conditional claim steps.
pub struct Dispatcher {
    store: Store,
    generator: Arc<dyn ContentGenerator>,
    chain: Arc<DeliveryChain>,
    tracker: EngagementTracker,
    renderer: Arc<dyn DocumentRenderer>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        store: Store,
        generator: Arc<dyn ContentGenerator>,
        chain: Arc<DeliveryChain>,
        tracker: EngagementTracker,
        renderer: Arc<dyn DocumentRenderer>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            generator,
            chain,
            tracker,
            renderer,
            config,
        }
    }

    fn stale_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::seconds(self.config.claim_lease_secs)
    }

    /// One dispatch cycle over due one-shot messages and due campaigns.
    pub async fn run_once(&self) -> Result<DispatchSummary, CadentError> {
        recording::record_dispatch_run();
        let now = Utc::now();
        let mut summary = DispatchSummary::default();

        let messages = self
            .store
            .due_messages(now, self.stale_before(now), self.config.batch_size)
            .await?;
        debug!(due = messages.len(), "one-shot messages due");
        for message in messages {
            if let Some(result) = self.process_message(message).await {
                summary.push(result);
            }
        }

        let campaigns = self
            .store
            .due_campaigns(now, self.config.batch_size)
            .await?;
        debug!(due = campaigns.len(), "campaigns due");
        for campaign in campaigns {
            if let Some(result) = self.process_campaign(campaign).await {
                summary.push(result);
            }
        }

        info!(
            processed = summary.processed,
            sent = summary.sent,
            suppressed = summary.suppressed,
            failed = summary.failed,
            "dispatch cycle complete"
        );
        Ok(summary)
    }

    /// One cycle over the followup queue (the authenticated sibling
    /// endpoint's extra table).
    pub async fn run_queue(&self) -> Result<DispatchSummary, CadentError> {
        let now = Utc::now();
        let mut summary = DispatchSummary::default();

        let items = self
            .store
            .due_queue_items(now, self.stale_before(now), self.config.batch_size)
            .await?;
        debug!(due = items.len(), "queue items due");
        for item in items {
            if let Some(result) = self.process_queue_item(item).await {
                summary.push(result);
            }
        }

        info!(
            processed = summary.processed,
            sent = summary.sent,
            suppressed = summary.suppressed,
            failed = summary.failed,
            "queue cycle complete"
        );
        Ok(summary)
    }

    // --- One-shot messages ---

    async fn process_message(&self, message: ScheduledMessage) -> Option<ItemResult> {
        let id = message.id.clone();
        let outcome = match self.try_message(message).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => return None,
            Err(e) => {
                error!(item_id = %id, error = %e, "message dispatch failed");
                recording::record_failure("message");
                ItemOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        recording::record_item("message");
        Some(ItemResult {
            id,
            kind: ItemKind::Message,
            outcome,
        })
    }

    async fn try_message(
        &self,
        message: ScheduledMessage,
    ) -> Result<Option<ItemOutcome>, CadentError> {
        let now = Utc::now();
        if !self
            .store
            .claim_message(&message.id, now, self.stale_before(now))
            .await?
        {
            debug!(item_id = %message.id, "already claimed, skipping");
            return Ok(None);
        }

        let Some(client) = self.store.get_client(&message.client_id).await? else {
            self.store
                .message_failed(&message.id, "client not found")
                .await?;
            return Ok(Some(ItemOutcome::Failed {
                error: "client not found".into(),
            }));
        };

        let invoice = match &message.related_invoice_id {
            Some(invoice_id) => self.store.get_invoice(invoice_id).await?,
            None => None,
        };

        // A one-shot tied to an invoice implicitly cancels once that
        // invoice is paid; there is nothing left to follow up on.
        let inputs = SuppressionInputs {
            pause_on_reply: false,
            cancel_if_paid: message.related_invoice_id.is_some(),
            scheduled_at: message.scheduled_at,
        };
        match evaluate(&inputs, &client, invoice.as_ref()) {
            SuppressionDecision::Proceed => {}
            SuppressionDecision::Cancel(reason) => {
                self.store.message_cancelled(&message.id).await?;
                recording::record_suppressed(&reason.to_string());
                return Ok(Some(ItemOutcome::Cancelled {
                    reason: reason.to_string(),
                }));
            }
            SuppressionDecision::Pause(reason) | SuppressionDecision::Skip(reason) => {
                self.store.message_skipped(&message.id).await?;
                recording::record_suppressed(&reason.to_string());
                return Ok(Some(ItemOutcome::Skipped {
                    reason: reason.to_string(),
                }));
            }
        }

        let mut email = outbound_email(
            &client,
            message.subject.as_deref().unwrap_or("Following up"),
            &message.body,
        );
        if let Some(invoice) = &invoice {
            self.attach_invoice(&mut email, invoice).await;
        }

        match self.deliver(&email).await {
            Ok(outcome) => {
                self.store.message_sent(&message.id, Utc::now()).await?;
                self.record_sent_event(&message.owner_id, &message.client_id, &message.id, &outcome)
                    .await;
                Ok(Some(ItemOutcome::Sent {
                    provider: outcome.provider_used,
                    message_id: outcome.message_id,
                }))
            }
            Err(e) => {
                let error = e.to_string();
                self.store.message_failed(&message.id, &error).await?;
                self.record_bounce_event(&message.owner_id, &message.client_id, &message.id, &error)
                    .await;
                recording::record_failure("delivery");
                Ok(Some(ItemOutcome::Failed { error }))
            }
        }
    }

    // --- Recurring campaigns ---

    async fn process_campaign(&self, campaign: RecurringCampaign) -> Option<ItemResult> {
        let id = campaign.id.clone();
        let outcome = match self.try_campaign(campaign).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => return None,
            Err(e) => {
                error!(item_id = %id, error = %e, "campaign dispatch failed");
                recording::record_failure("campaign");
                ItemOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        recording::record_item("campaign");
        Some(ItemResult {
            id,
            kind: ItemKind::Campaign,
            outcome,
        })
    }

    async fn try_campaign(
        &self,
        campaign: RecurringCampaign,
    ) -> Result<Option<ItemOutcome>, CadentError> {
        let now = Utc::now();
        let original_due = campaign.next_run_at.unwrap_or(now);
        let lease = now + Duration::seconds(self.config.claim_lease_secs);
        if !self.store.claim_campaign(&campaign.id, lease, now).await? {
            debug!(item_id = %campaign.id, "already claimed, skipping");
            return Ok(None);
        }

        // The rule-level endAfter bound acts as a send budget too.
        let max_sends = campaign.max_sends.or(campaign.recurrence.end_after);
        if max_sends.is_some_and(|max| campaign.send_count >= max) {
            self.store.complete_campaign(&campaign.id).await?;
            info!(item_id = %campaign.id, send_count = campaign.send_count, "campaign completed");
            return Ok(Some(ItemOutcome::Completed));
        }

        // A rule that can never produce another run would otherwise burn a
        // generation call and then complete; surface it as a failure.
        if campaign.recurrence.kind != RecurrenceType::Once
            && campaign.recurrence.time_parts().is_none()
        {
            self.store.fail_campaign(&campaign.id).await?;
            return Ok(Some(ItemOutcome::Failed {
                error: format!(
                    "invalid recurrence rule: unparseable time_of_day `{}`",
                    campaign.recurrence.time_of_day
                ),
            }));
        }

        let Some(client) = self.store.get_client(&campaign.client_id).await? else {
            self.store.fail_campaign(&campaign.id).await?;
            return Ok(Some(ItemOutcome::Failed {
                error: "client not found".into(),
            }));
        };

        let inputs = SuppressionInputs {
            pause_on_reply: false,
            cancel_if_paid: false,
            scheduled_at: original_due,
        };
        match evaluate(&inputs, &client, None) {
            SuppressionDecision::Proceed => {}
            SuppressionDecision::Cancel(reason)
            | SuppressionDecision::Pause(reason)
            | SuppressionDecision::Skip(reason) => {
                self.store.pause_campaign(&campaign.id).await?;
                recording::record_suppressed(&reason.to_string());
                return Ok(Some(ItemOutcome::Paused {
                    reason: reason.to_string(),
                }));
            }
        }

        let history = self
            .store
            .campaign_history(&campaign.id, self.config.history_limit)
            .await?;
        let request = GenerationRequest {
            owner_id: campaign.owner_id.clone(),
            client_context: format!("{} <{}>", client.name, client.email),
            business_context: campaign.context.clone(),
            prior_messages: history
                .iter()
                .map(|m| format!("{}: {}", m.subject, m.summary))
                .collect(),
            requested_tone: campaign.tone.clone(),
            attempt_index: campaign.send_count,
        };

        let generated = match tokio::time::timeout(
            self.config.generation_timeout,
            self.generator.generate(&request),
        )
        .await
        {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                // Campaign state stays untouched; the next invocation
                // retries. Rate-limit rejections take the same path.
                self.store
                    .restore_campaign_next_run(&campaign.id, original_due)
                    .await?;
                recording::record_failure("generation");
                warn!(item_id = %campaign.id, error = %e, "content generation failed");
                return Ok(Some(ItemOutcome::Failed {
                    error: e.to_string(),
                }));
            }
            Err(_) => {
                self.store
                    .restore_campaign_next_run(&campaign.id, original_due)
                    .await?;
                recording::record_failure("generation");
                return Ok(Some(ItemOutcome::Failed {
                    error: format!(
                        "generation timed out after {:?}",
                        self.config.generation_timeout
                    ),
                }));
            }
        };

        let email = outbound_email(&client, &generated.subject, &generated.body);
        match self.deliver(&email).await {
            Ok(outcome) => {
                let sent_at = Utc::now();
                let next = next_run(&campaign.recurrence, sent_at);
                self.store
                    .campaign_send_recorded(&campaign.id, sent_at, next)
                    .await?;
                self.store
                    .add_campaign_message(&CampaignMessage {
                        id: Uuid::new_v4().to_string(),
                        campaign_id: campaign.id.clone(),
                        subject: generated.subject.clone(),
                        summary: summarize(&generated.body),
                        created_at: sent_at,
                    })
                    .await?;
                self.record_sent_event(
                    &campaign.owner_id,
                    &campaign.client_id,
                    &campaign.id,
                    &outcome,
                )
                .await;

                let new_count = campaign.send_count + 1;
                if max_sends.is_some_and(|max| new_count >= max) || next.is_none() {
                    self.store.complete_campaign(&campaign.id).await?;
                    info!(item_id = %campaign.id, send_count = new_count, "campaign completed");
                }
                Ok(Some(ItemOutcome::Sent {
                    provider: outcome.provider_used,
                    message_id: outcome.message_id,
                }))
            }
            Err(e) => {
                let error = e.to_string();
                self.store
                    .restore_campaign_next_run(&campaign.id, original_due)
                    .await?;
                self.record_bounce_event(
                    &campaign.owner_id,
                    &campaign.client_id,
                    &campaign.id,
                    &error,
                )
                .await;
                recording::record_failure("delivery");
                Ok(Some(ItemOutcome::Failed { error }))
            }
        }
    }

    // --- Followup queue items ---

    async fn process_queue_item(&self, item: FollowupQueueItem) -> Option<ItemResult> {
        let id = item.id.clone();
        let outcome = match self.try_queue_item(item).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => return None,
            Err(e) => {
                error!(item_id = %id, error = %e, "queue item dispatch failed");
                recording::record_failure("queue");
                ItemOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        recording::record_item("queue");
        Some(ItemResult {
            id,
            kind: ItemKind::Queue,
            outcome,
        })
    }

    async fn try_queue_item(
        &self,
        item: FollowupQueueItem,
    ) -> Result<Option<ItemOutcome>, CadentError> {
        let now = Utc::now();
        if !self
            .store
            .claim_queue_item(&item.id, now, self.stale_before(now))
            .await?
        {
            debug!(item_id = %item.id, "already claimed, skipping");
            return Ok(None);
        }

        let Some(client) = self.store.get_client(&item.client_id).await? else {
            self.store
                .queue_item_failed(&item.id, "client not found")
                .await?;
            return Ok(Some(ItemOutcome::Failed {
                error: "client not found".into(),
            }));
        };

        let invoice = match &item.related_invoice_id {
            Some(invoice_id) => self.store.get_invoice(invoice_id).await?,
            None => None,
        };

        let inputs = SuppressionInputs {
            pause_on_reply: item.pause_on_reply,
            cancel_if_paid: item.cancel_if_paid,
            scheduled_at: item.scheduled_at,
        };
        match evaluate(&inputs, &client, invoice.as_ref()) {
            SuppressionDecision::Proceed => {}
            SuppressionDecision::Cancel(reason) => {
                self.store.queue_item_cancelled(&item.id).await?;
                recording::record_suppressed(&reason.to_string());
                return Ok(Some(ItemOutcome::Cancelled {
                    reason: reason.to_string(),
                }));
            }
            SuppressionDecision::Pause(reason) => {
                self.store.queue_item_paused(&item.id).await?;
                recording::record_suppressed(&reason.to_string());
                return Ok(Some(ItemOutcome::Paused {
                    reason: reason.to_string(),
                }));
            }
            SuppressionDecision::Skip(reason) => {
                self.store.queue_item_skipped(&item.id).await?;
                recording::record_suppressed(&reason.to_string());
                return Ok(Some(ItemOutcome::Skipped {
                    reason: reason.to_string(),
                }));
            }
        }

        let mut email = outbound_email(
            &client,
            item.subject.as_deref().unwrap_or("Following up"),
            &item.body,
        );
        if let Some(invoice) = &invoice {
            self.attach_invoice(&mut email, invoice).await;
        }

        match self.deliver(&email).await {
            Ok(outcome) => {
                self.store.queue_item_sent(&item.id).await?;
                self.record_sent_event(&item.owner_id, &item.client_id, &item.id, &outcome)
                    .await;
                Ok(Some(ItemOutcome::Sent {
                    provider: outcome.provider_used,
                    message_id: outcome.message_id,
                }))
            }
            Err(e) => {
                let error = e.to_string();
                let status = self.store.queue_item_failed(&item.id, &error).await?;
                recording::record_failure("delivery");
                if status == QueueItemStatus::Failed {
                    self.record_bounce_event(&item.owner_id, &item.client_id, &item.id, &error)
                        .await;
                    Ok(Some(ItemOutcome::Failed { error }))
                } else {
                    warn!(item_id = %item.id, error = %error, "queue item requeued for retry");
                    Ok(Some(ItemOutcome::Requeued { error }))
                }
            }
        }
    }

    // --- Shared steps ---

    async fn deliver(&self, email: &OutboundEmail) -> Result<DeliveryOutcome, CadentError> {
        let started = std::time::Instant::now();
        let result = self.chain.send(email).await;
        recording::record_delivery_latency(started.elapsed().as_secs_f64());
        if let Ok(outcome) = &result {
            recording::record_send(&outcome.provider_used);
        }
        result
    }

    /// Attachment generation must not fail the send: log and continue
    /// without it.
    async fn attach_invoice(&self, email: &mut OutboundEmail, invoice: &Invoice) {
        match self.renderer.render_invoice(invoice).await {
            Ok(Some(attachment)) => email.attachments.push(attachment),
            Ok(None) => {}
            Err(e) => {
                warn!(
                    invoice_id = %invoice.id,
                    error = %e,
                    "invoice rendering failed, sending without attachment"
                );
            }
        }
    }

    async fn record_sent_event(
        &self,
        owner_id: &str,
        client_id: &str,
        message_id: &str,
        outcome: &DeliveryOutcome,
    ) {
        let input = EventInput {
            owner_id: owner_id.to_string(),
            client_id: client_id.to_string(),
            message_id: message_id.to_string(),
            kind: AnalyticsEventKind::Sent,
            bounce_kind: None,
            data: Some(
                serde_json::json!({
                    "provider": outcome.provider_used,
                    "messageId": outcome.message_id,
                    "attempts": outcome.attempts,
                })
                .to_string(),
            ),
        };
        if let Err(e) = self.tracker.record(input).await {
            warn!(client_id, error = %e, "failed to record sent event");
        }
    }

    async fn record_bounce_event(
        &self,
        owner_id: &str,
        client_id: &str,
        message_id: &str,
        error: &str,
    ) {
        let input = EventInput {
            owner_id: owner_id.to_string(),
            client_id: client_id.to_string(),
            message_id: message_id.to_string(),
            kind: AnalyticsEventKind::Bounced,
            bounce_kind: Some(classify_bounce(error)),
            data: Some(serde_json::json!({ "error": error }).to_string()),
        };
        if let Err(e) = self.tracker.record(input).await {
            warn!(client_id, error = %e, "failed to record bounce event");
        }
    }
}

fn outbound_email(client: &Client, subject: &str, body: &str) -> OutboundEmail {
    OutboundEmail {
        to: client.email.clone(),
        to_name: Some(client.name.clone()),
        subject: subject.to_string(),
        text: body.to_string(),
        html: None,
        attachments: Vec::new(),
    }
}

/// Single-line summary of a sent body for the campaign history feed.
fn summarize(body: &str) -> String {
    let flattened = body.trim().replace('\n', " ");
    if flattened.chars().count() > 160 {
        let truncated: String = flattened.chars().take(157).collect();
        format!("{truncated}...")
    } else {
        flattened
    }
}
