// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the storage crate's tests.

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use crate::database::Database;
use crate::models::{
    CampaignStatus, Client, FollowupQueueItem, Invoice, InvoiceStatus, MessageStatus,
    QueueItemStatus, RecurringCampaign, ScheduledMessage,
};

pub(crate) async fn open_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("test.db").to_str().unwrap())
        .await
        .unwrap();
    (db, dir)
}

pub(crate) fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

pub(crate) fn client(id: &str) -> Client {
    Client {
        id: id.into(),
        owner_id: "owner-1".into(),
        name: "Ada Example".into(),
        email: "ada@example.com".into(),
        bounce_count: 0,
        soft_bounce_count: 0,
        last_bounce_at: None,
        followups_paused: false,
        unsubscribed: false,
        last_reply_at: None,
        engagement_score: 50,
        created_at: created_at(),
    }
}

pub(crate) fn invoice(id: &str, client_id: &str, status: InvoiceStatus) -> Invoice {
    Invoice {
        id: id.into(),
        owner_id: "owner-1".into(),
        client_id: client_id.into(),
        status,
        amount_cents: 250_00,
        issued_at: created_at(),
    }
}

pub(crate) fn message(id: &str, client_id: &str, scheduled_at: DateTime<Utc>) -> ScheduledMessage {
    ScheduledMessage {
        id: id.into(),
        owner_id: "owner-1".into(),
        client_id: client_id.into(),
        status: MessageStatus::Queued,
        scheduled_at,
        related_invoice_id: None,
        subject: Some("Checking in".into()),
        body: "Just following up on the invoice I sent over.".into(),
        sent_at: None,
        last_error: None,
        created_at: created_at(),
    }
}

pub(crate) fn campaign(
    id: &str,
    client_id: &str,
    next_run_at: Option<DateTime<Utc>>,
) -> RecurringCampaign {
    RecurringCampaign {
        id: id.into(),
        owner_id: "owner-1".into(),
        client_id: client_id.into(),
        status: CampaignStatus::Scheduled,
        recurrence: serde_json::from_str(
            r#"{"type": "weekly", "interval": 1, "timeOfDay": "09:00", "daysOfWeek": [1, 3]}"#,
        )
        .unwrap(),
        tone: "friendly".into(),
        context: "freelance design studio".into(),
        send_count: 0,
        max_sends: Some(3),
        next_run_at,
        last_sent_at: None,
        created_at: created_at(),
    }
}

pub(crate) fn queue_item(
    id: &str,
    client_id: &str,
    scheduled_at: DateTime<Utc>,
) -> FollowupQueueItem {
    FollowupQueueItem {
        id: id.into(),
        owner_id: "owner-1".into(),
        client_id: client_id.into(),
        status: QueueItemStatus::Queued,
        scheduled_at,
        related_invoice_id: None,
        subject: Some("Friendly reminder".into()),
        body: "A quick nudge about the outstanding balance.".into(),
        pause_on_reply: true,
        cancel_if_paid: true,
        retry_count: 0,
        max_retries: 3,
        last_error: None,
        created_at: created_at(),
    }
}
