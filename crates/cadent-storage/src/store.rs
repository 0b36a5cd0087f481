// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Store` facade the rest of the workspace consumes.
//!
//! Wraps a [`Database`] handle and delegates to the typed query modules,
//! keeping raw SQL out of every other crate.

use chrono::{DateTime, Utc};

use cadent_core::CadentError;

use crate::database::Database;
use crate::models::{
    AnalyticsEvent, CampaignMessage, Client, FollowupQueueItem, Invoice, InvoiceStatus,
    QueueItemStatus, RecurringCampaign, ScheduledMessage,
};
use crate::queries;

/// SQLite-backed record store for the follow-up engine.
#[derive(Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) the store at `path` and run migrations.
    pub async fn open(path: &str) -> Result<Self, CadentError> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    /// Checkpoint and release the underlying connection.
    pub async fn close(&self) -> Result<(), CadentError> {
        self.db.close().await
    }

    /// Cheap connectivity probe for health endpoints.
    pub async fn health_check(&self) -> Result<(), CadentError> {
        self.db
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
    }

    // --- Clients ---

    pub async fn insert_client(&self, client: &Client) -> Result<(), CadentError> {
        queries::clients::insert(&self.db, client).await
    }

    pub async fn get_client(&self, id: &str) -> Result<Option<Client>, CadentError> {
        queries::clients::get(&self.db, id).await
    }

    pub async fn save_client_signals(&self, client: &Client) -> Result<(), CadentError> {
        queries::clients::save_signals(&self.db, client).await
    }

    pub async fn record_client_reply(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), CadentError> {
        queries::clients::record_reply(&self.db, id, at).await
    }

    pub async fn reactivate_client(&self, id: &str) -> Result<(), CadentError> {
        queries::clients::reactivate(&self.db, id).await
    }

    // --- Invoices ---

    pub async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), CadentError> {
        queries::invoices::insert(&self.db, invoice).await
    }

    pub async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, CadentError> {
        queries::invoices::get(&self.db, id).await
    }

    pub async fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<(), CadentError> {
        queries::invoices::set_status(&self.db, id, status).await
    }

    // --- Scheduled messages ---

    pub async fn insert_message(&self, msg: &ScheduledMessage) -> Result<(), CadentError> {
        queries::messages::insert(&self.db, msg).await
    }

    pub async fn get_message(&self, id: &str) -> Result<Option<ScheduledMessage>, CadentError> {
        queries::messages::get(&self.db, id).await
    }

    pub async fn due_messages(
        &self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<ScheduledMessage>, CadentError> {
        queries::messages::list_due(&self.db, now, stale_before, limit).await
    }

    pub async fn claim_message(
        &self,
        id: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, CadentError> {
        queries::messages::claim(&self.db, id, now, stale_before).await
    }

    pub async fn message_sent(&self, id: &str, at: DateTime<Utc>) -> Result<(), CadentError> {
        queries::messages::mark_sent(&self.db, id, at).await
    }

    pub async fn message_failed(&self, id: &str, error: &str) -> Result<(), CadentError> {
        queries::messages::mark_failed(&self.db, id, error).await
    }

    pub async fn message_cancelled(&self, id: &str) -> Result<(), CadentError> {
        queries::messages::mark_cancelled(&self.db, id).await
    }

    pub async fn message_skipped(&self, id: &str) -> Result<(), CadentError> {
        queries::messages::mark_skipped(&self.db, id).await
    }

    // --- Recurring campaigns ---

    pub async fn insert_campaign(&self, campaign: &RecurringCampaign) -> Result<(), CadentError> {
        queries::campaigns::insert(&self.db, campaign).await
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Option<RecurringCampaign>, CadentError> {
        queries::campaigns::get(&self.db, id).await
    }

    pub async fn due_campaigns(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<RecurringCampaign>, CadentError> {
        queries::campaigns::list_due(&self.db, now, limit).await
    }

    pub async fn claim_campaign(
        &self,
        id: &str,
        lease_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, CadentError> {
        queries::campaigns::claim(&self.db, id, lease_until, now).await
    }

    pub async fn campaign_send_recorded(
        &self,
        id: &str,
        sent_at: DateTime<Utc>,
        next_run_at: Option<DateTime<Utc>>,
    ) -> Result<(), CadentError> {
        queries::campaigns::record_send(&self.db, id, sent_at, next_run_at).await
    }

    pub async fn restore_campaign_next_run(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), CadentError> {
        queries::campaigns::restore_next_run(&self.db, id, at).await
    }

    pub async fn complete_campaign(&self, id: &str) -> Result<(), CadentError> {
        queries::campaigns::complete(&self.db, id).await
    }

    pub async fn pause_campaign(&self, id: &str) -> Result<(), CadentError> {
        queries::campaigns::pause(&self.db, id).await
    }

    pub async fn fail_campaign(&self, id: &str) -> Result<(), CadentError> {
        queries::campaigns::fail(&self.db, id).await
    }

    pub async fn add_campaign_message(&self, msg: &CampaignMessage) -> Result<(), CadentError> {
        queries::campaigns::insert_message(&self.db, msg).await
    }

    pub async fn campaign_history(
        &self,
        campaign_id: &str,
        limit: u32,
    ) -> Result<Vec<CampaignMessage>, CadentError> {
        queries::campaigns::list_history(&self.db, campaign_id, limit).await
    }

    // --- Followup queue ---

    pub async fn insert_queue_item(&self, item: &FollowupQueueItem) -> Result<(), CadentError> {
        queries::queue::insert(&self.db, item).await
    }

    pub async fn get_queue_item(
        &self,
        id: &str,
    ) -> Result<Option<FollowupQueueItem>, CadentError> {
        queries::queue::get(&self.db, id).await
    }

    pub async fn due_queue_items(
        &self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<FollowupQueueItem>, CadentError> {
        queries::queue::list_due(&self.db, now, stale_before, limit).await
    }

    pub async fn claim_queue_item(
        &self,
        id: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, CadentError> {
        queries::queue::claim(&self.db, id, now, stale_before).await
    }

    pub async fn queue_item_sent(&self, id: &str) -> Result<(), CadentError> {
        queries::queue::mark_sent(&self.db, id).await
    }

    pub async fn queue_item_paused(&self, id: &str) -> Result<(), CadentError> {
        queries::queue::mark_paused(&self.db, id).await
    }

    pub async fn queue_item_cancelled(&self, id: &str) -> Result<(), CadentError> {
        queries::queue::mark_cancelled(&self.db, id).await
    }

    pub async fn queue_item_skipped(&self, id: &str) -> Result<(), CadentError> {
        queries::queue::mark_skipped(&self.db, id).await
    }

    pub async fn queue_item_failed(
        &self,
        id: &str,
        error: &str,
    ) -> Result<QueueItemStatus, CadentError> {
        queries::queue::record_failure(&self.db, id, error).await
    }

    pub async fn cancel_queued_for_client(&self, client_id: &str) -> Result<usize, CadentError> {
        queries::queue::cancel_queued_for_client(&self.db, client_id).await
    }

    // --- Analytics events ---

    pub async fn append_event(&self, event: &AnalyticsEvent) -> Result<(), CadentError> {
        queries::events::append(&self.db, event).await
    }

    pub async fn events_for_client(
        &self,
        client_id: &str,
        limit: u32,
    ) -> Result<Vec<AnalyticsEvent>, CadentError> {
        queries::events::list_for_client(&self.db, client_id, limit).await
    }
}
