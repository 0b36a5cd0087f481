// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entities and common types shared across the Cadent workspace.
//!
//! These are the typed shapes at the core boundary; the storage crate is
//! the only place that deals with raw row payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A client the engine sends follow-ups to, including the trust signals
/// maintained by the engagement tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    /// Total bounces, hard and soft.
    pub bounce_count: u32,
    /// Soft bounces only; three of these pause follow-ups.
    pub soft_bounce_count: u32,
    pub last_bounce_at: Option<DateTime<Utc>>,
    pub followups_paused: bool,
    pub unsubscribed: bool,
    pub last_reply_at: Option<DateTime<Utc>>,
    /// Bounded trust signal in [0, 100]; new clients start at 50.
    pub engagement_score: i64,
    pub created_at: DateTime<Utc>,
}

/// Invoice lifecycle status. Read-only input to suppression.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Void,
}

/// An invoice a follow-up may be tied to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub owner_id: String,
    pub client_id: String,
    pub status: InvoiceStatus,
    pub amount_cents: i64,
    pub issued_at: DateTime<Utc>,
}

/// Status of a one-shot scheduled message.
///
/// `Sending` is the transient claim state held while a dispatch invocation
/// owns the row; stale claims are reclaimed after a lease expires.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Draft,
    Queued,
    Sending,
    Sent,
    Cancelled,
    Skipped,
    Failed,
}

/// A one-shot message composed up front and sent at `scheduled_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub id: String,
    pub owner_id: String,
    pub client_id: String,
    pub status: MessageStatus,
    pub scheduled_at: DateTime<Utc>,
    pub related_invoice_id: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Status of a recurring campaign.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Scheduled,
    Paused,
    Completed,
    Cancelled,
    Failed,
}

/// A recurring follow-up campaign tied to one client, with freshly
/// generated content for each send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringCampaign {
    pub id: String,
    pub owner_id: String,
    pub client_id: String,
    pub status: CampaignStatus,
    pub recurrence: RecurrenceRule,
    pub tone: String,
    /// Free-form business context handed to the content generator.
    pub context: String,
    pub send_count: u32,
    pub max_sends: Option<u32>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RecurringCampaign {
    /// Returns true once the campaign has used up its send budget.
    pub fn sends_exhausted(&self) -> bool {
        self.max_sends.is_some_and(|max| self.send_count >= max)
    }
}

/// History record of one message sent for a campaign; the summaries feed
/// the content-variation instructions for subsequent sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignMessage {
    pub id: String,
    pub campaign_id: String,
    pub subject: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// Status of a conditionally-suppressible queue item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueueItemStatus {
    Queued,
    Sending,
    Sent,
    Paused,
    Cancelled,
    Skipped,
    Failed,
}

/// A one-shot follow-up that is re-checked against reply and payment
/// state at dispatch time, with a bounded retry budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupQueueItem {
    pub id: String,
    pub owner_id: String,
    pub client_id: String,
    pub status: QueueItemStatus,
    pub scheduled_at: DateTime<Utc>,
    pub related_invoice_id: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub pause_on_reply: bool,
    pub cancel_if_paid: bool,
    pub retry_count: u32,
    pub max_retries: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Delivery lifecycle event kinds recorded in the append-only analytics log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsEventKind {
    Sent,
    Delivered,
    Opened,
    Clicked,
    Bounced,
    Complained,
}

/// Hard (permanent) vs. soft (temporary) bounce classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BounceKind {
    Hard,
    Soft,
}

/// One entry in the append-only delivery analytics log. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: String,
    pub owner_id: String,
    pub client_id: String,
    pub message_id: String,
    pub event: AnalyticsEventKind,
    pub bounce_kind: Option<BounceKind>,
    /// Free-form JSON payload from the provider, if any.
    pub data: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Recurrence rule ---

/// Recurrence cadence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A recurrence rule, wire-compatible with the JSON shape the composition
/// layer persists: `{"type": "weekly", "interval": 1, "timeOfDay": "09:00",
/// "daysOfWeek": [1, 3]}`. Weekdays are 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub kind: RecurrenceType,
    #[serde(default = "default_interval")]
    pub interval: u32,
    pub time_of_day: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_after: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    /// Parse `time_of_day` ("HH:MM") into hour and minute.
    /// Returns `None` when the string is malformed or out of range.
    pub fn time_parts(&self) -> Option<(u32, u32)> {
        let (h, m) = self.time_of_day.split_once(':')?;
        let hour: u32 = h.parse().ok()?;
        let minute: u32 = m.parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some((hour, minute))
    }
}

// --- Delivery types ---

/// A binary attachment for an outbound email.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A fully rendered email ready for a delivery provider.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// What a provider reports back on acceptance.
#[derive(Debug, Clone, Default)]
pub struct ProviderReceipt {
    pub message_id: Option<String>,
}

/// Aggregate result of a send through the provider chain.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub provider_used: String,
    pub message_id: Option<String>,
    pub attempts: u32,
}

// --- Generation types ---

/// A request to the content-generation boundary.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub owner_id: String,
    pub client_context: String,
    pub business_context: String,
    /// Summaries of recent same-campaign messages, oldest first.
    pub prior_messages: Vec<String>,
    pub requested_tone: String,
    pub attempt_index: u32,
}

/// Subject and body produced by the content generator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratedContent {
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurrence_rule_wire_shape_round_trips() {
        let json = r#"{
            "type": "weekly",
            "interval": 2,
            "timeOfDay": "09:30",
            "daysOfWeek": [1, 3],
            "endAfter": 5
        }"#;
        let rule: RecurrenceRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.kind, RecurrenceType::Weekly);
        assert_eq!(rule.interval, 2);
        assert_eq!(rule.days_of_week.as_deref(), Some(&[1u8, 3][..]));
        assert_eq!(rule.end_after, Some(5));
        assert_eq!(rule.time_parts(), Some((9, 30)));

        let back = serde_json::to_string(&rule).unwrap();
        assert!(back.contains("\"timeOfDay\":\"09:30\""));
        assert!(back.contains("\"type\":\"weekly\""));
        assert!(!back.contains("endDate"), "unset fields are omitted");
    }

    #[test]
    fn recurrence_rule_interval_defaults_to_one() {
        let json = r#"{"type": "daily", "timeOfDay": "08:00"}"#;
        let rule: RecurrenceRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.interval, 1);
        assert!(rule.days_of_week.is_none());
    }

    #[test]
    fn time_parts_rejects_malformed_input() {
        let mut rule: RecurrenceRule =
            serde_json::from_str(r#"{"type": "daily", "timeOfDay": "08:00"}"#).unwrap();
        rule.time_of_day = "25:00".into();
        assert_eq!(rule.time_parts(), None);
        rule.time_of_day = "nine".into();
        assert_eq!(rule.time_parts(), None);
        rule.time_of_day = "09:61".into();
        assert_eq!(rule.time_parts(), None);
    }

    #[test]
    fn status_enums_round_trip_as_text() {
        use std::str::FromStr;
        assert_eq!(MessageStatus::Queued.to_string(), "queued");
        assert_eq!(
            MessageStatus::from_str("cancelled").unwrap(),
            MessageStatus::Cancelled
        );
        assert_eq!(CampaignStatus::Scheduled.to_string(), "scheduled");
        assert_eq!(
            QueueItemStatus::from_str("skipped").unwrap(),
            QueueItemStatus::Skipped
        );
        assert_eq!(InvoiceStatus::Paid.to_string(), "paid");
        assert_eq!(AnalyticsEventKind::Bounced.to_string(), "bounced");
    }

    #[test]
    fn sends_exhausted_respects_budget() {
        let rule: RecurrenceRule =
            serde_json::from_str(r#"{"type": "weekly", "timeOfDay": "09:00"}"#).unwrap();
        let mut campaign = RecurringCampaign {
            id: "camp-1".into(),
            owner_id: "owner-1".into(),
            client_id: "client-1".into(),
            status: CampaignStatus::Scheduled,
            recurrence: rule,
            tone: "friendly".into(),
            context: "freelance design studio".into(),
            send_count: 2,
            max_sends: Some(3),
            next_run_at: None,
            last_sent_at: None,
            created_at: Utc::now(),
        };
        assert!(!campaign.sends_exhausted());
        campaign.send_count = 3;
        assert!(campaign.sends_exhausted());
        campaign.max_sends = None;
        assert!(!campaign.sends_exhausted());
    }
}
