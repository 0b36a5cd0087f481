// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring campaign queries.
//!
//! Claiming a due campaign pushes `next_run_at` forward by a short lease
//! (the same shape as a queue lock timeout): a crashed invocation leaves
//! the campaign schedulable again once the lease expires, a successful
//! send overwrites the lease with the real next run, and a failed cycle
//! restores the original due time so the next invocation retries it.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use cadent_core::CadentError;

use crate::database::{invalid_column, parse_ts, parse_ts_opt, ts, Database};
use crate::models::{CampaignMessage, CampaignStatus, RecurringCampaign};

const COLS: &str = "id, owner_id, client_id, status, recurrence, tone, context, send_count, \
                    max_sends, next_run_at, last_sent_at, created_at";

fn row_to_campaign(row: &rusqlite::Row<'_>) -> Result<RecurringCampaign, rusqlite::Error> {
    let status: String = row.get(3)?;
    let recurrence: String = row.get(4)?;
    Ok(RecurringCampaign {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        client_id: row.get(2)?,
        status: CampaignStatus::from_str(&status).map_err(|e| invalid_column(3, e))?,
        recurrence: serde_json::from_str(&recurrence).map_err(|e| invalid_column(4, e))?,
        tone: row.get(5)?,
        context: row.get(6)?,
        send_count: row.get(7)?,
        max_sends: row.get(8)?,
        next_run_at: parse_ts_opt(9, row.get(9)?)?,
        last_sent_at: parse_ts_opt(10, row.get(10)?)?,
        created_at: parse_ts(11, row.get(11)?)?,
    })
}

/// Insert a new campaign.
pub async fn insert(db: &Database, campaign: &RecurringCampaign) -> Result<(), CadentError> {
    let c = campaign.clone();
    let recurrence = serde_json::to_string(&c.recurrence).map_err(|e| {
        CadentError::Storage {
            source: Box::new(e),
        }
    })?;
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO recurring_campaigns
                 (id, owner_id, client_id, status, recurrence, tone, context, send_count,
                  max_sends, next_run_at, last_sent_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                c.id,
                c.owner_id,
                c.client_id,
                c.status.to_string(),
                recurrence,
                c.tone,
                c.context,
                c.send_count,
                c.max_sends,
                c.next_run_at.map(ts),
                c.last_sent_at.map(ts),
                ts(c.created_at),
            ],
        )?;
        Ok(())
    })
    .await
}

/// Fetch a campaign by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<RecurringCampaign>, CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.query_row(
            &format!("SELECT {COLS} FROM recurring_campaigns WHERE id = ?1"),
            params![id],
            row_to_campaign,
        )
        .optional()
    })
    .await
}

/// List campaigns due for a send.
pub async fn list_due(
    db: &Database,
    now: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<RecurringCampaign>, CadentError> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLS} FROM recurring_campaigns
              WHERE status = 'scheduled' AND next_run_at IS NOT NULL AND next_run_at <= ?1
              ORDER BY next_run_at ASC
              LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![ts(now), limit], row_to_campaign)?;
        rows.collect()
    })
    .await
}

/// Atomically claim a due campaign by leasing `next_run_at` forward.
/// Returns false when another invocation got there first.
pub async fn claim(
    db: &Database,
    id: &str,
    lease_until: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<bool, CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        let changed = conn.execute(
            "UPDATE recurring_campaigns
                SET next_run_at = ?2
              WHERE id = ?1 AND status = 'scheduled'
                AND next_run_at IS NOT NULL AND next_run_at <= ?3",
            params![id, ts(lease_until), ts(now)],
        )?;
        Ok(changed > 0)
    })
    .await
}

/// Record a successful send: bump the counter, stamp `last_sent_at`, and
/// replace the claim lease with the freshly computed next run. The
/// `max_sends` guard makes the send-budget invariant hold at the store
/// level as well.
pub async fn record_send(
    db: &Database,
    id: &str,
    sent_at: DateTime<Utc>,
    next_run_at: Option<DateTime<Utc>>,
) -> Result<(), CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE recurring_campaigns
                SET send_count = send_count + 1, last_sent_at = ?2, next_run_at = ?3
              WHERE id = ?1 AND status = 'scheduled'
                AND (max_sends IS NULL OR send_count < max_sends)",
            params![id, ts(sent_at), next_run_at.map(ts)],
        )?;
        Ok(())
    })
    .await
}

/// Put the original due time back after a failed cycle so the campaign is
/// retried on the next invocation, state otherwise untouched.
pub async fn restore_next_run(
    db: &Database,
    id: &str,
    at: DateTime<Utc>,
) -> Result<(), CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE recurring_campaigns SET next_run_at = ?2
              WHERE id = ?1 AND status = 'scheduled'",
            params![id, ts(at)],
        )?;
        Ok(())
    })
    .await
}

/// Terminal transition once the send budget is used up or the recurrence
/// has ended.
pub async fn complete(db: &Database, id: &str) -> Result<(), CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE recurring_campaigns SET status = 'completed', next_run_at = NULL
              WHERE id = ?1 AND status = 'scheduled'",
            params![id],
        )?;
        Ok(())
    })
    .await
}

/// Reversible pause, applied when the campaign's client is unsubscribed
/// or has follow-ups paused. An external resume flips the status back to
/// `scheduled` and restores a next run.
pub async fn pause(db: &Database, id: &str) -> Result<(), CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE recurring_campaigns SET status = 'paused'
              WHERE id = ?1 AND status = 'scheduled'",
            params![id],
        )?;
        Ok(())
    })
    .await
}

/// Terminal transition for campaigns with unusable configuration (e.g. a
/// recurrence rule that cannot produce a next run).
pub async fn fail(db: &Database, id: &str) -> Result<(), CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE recurring_campaigns SET status = 'failed', next_run_at = NULL
              WHERE id = ?1 AND status = 'scheduled'",
            params![id],
        )?;
        Ok(())
    })
    .await
}

/// Append a history record for a sent campaign message.
pub async fn insert_message(db: &Database, msg: &CampaignMessage) -> Result<(), CadentError> {
    let m = msg.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO campaign_messages (id, campaign_id, subject, summary, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![m.id, m.campaign_id, m.subject, m.summary, ts(m.created_at)],
        )?;
        Ok(())
    })
    .await
}

/// The most recent `limit` history records for a campaign, oldest first,
/// as fed to the content generator for variation.
pub async fn list_history(
    db: &Database,
    campaign_id: &str,
    limit: u32,
) -> Result<Vec<CampaignMessage>, CadentError> {
    let campaign_id = campaign_id.to_string();
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT id, campaign_id, subject, summary, created_at
               FROM campaign_messages
              WHERE campaign_id = ?1
              ORDER BY created_at DESC
              LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![campaign_id, limit], |row| {
            Ok(CampaignMessage {
                id: row.get(0)?,
                campaign_id: row.get(1)?,
                subject: row.get(2)?,
                summary: row.get(3)?,
                created_at: parse_ts(4, row.get(4)?)?,
            })
        })?;
        let mut history: Vec<CampaignMessage> = rows.collect::<Result<_, _>>()?;
        history.reverse();
        Ok(history)
    })
    .await
}
