// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Followup queue queries: conditionally-suppressible one-shot items with
//! a bounded retry budget.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use cadent_core::CadentError;

use crate::database::{invalid_column, parse_ts, ts, Database};
use crate::models::{FollowupQueueItem, QueueItemStatus};

const COLS: &str = "id, owner_id, client_id, status, scheduled_at, related_invoice_id, \
                    subject, body, pause_on_reply, cancel_if_paid, retry_count, \
                    max_retries, last_error, created_at";

fn row_to_item(row: &rusqlite::Row<'_>) -> Result<FollowupQueueItem, rusqlite::Error> {
    let status: String = row.get(3)?;
    Ok(FollowupQueueItem {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        client_id: row.get(2)?,
        status: QueueItemStatus::from_str(&status).map_err(|e| invalid_column(3, e))?,
        scheduled_at: parse_ts(4, row.get(4)?)?,
        related_invoice_id: row.get(5)?,
        subject: row.get(6)?,
        body: row.get(7)?,
        pause_on_reply: row.get(8)?,
        cancel_if_paid: row.get(9)?,
        retry_count: row.get(10)?,
        max_retries: row.get(11)?,
        last_error: row.get(12)?,
        created_at: parse_ts(13, row.get(13)?)?,
    })
}

/// Insert a new queue item.
pub async fn insert(db: &Database, item: &FollowupQueueItem) -> Result<(), CadentError> {
    let i = item.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO followup_queue
                 (id, owner_id, client_id, status, scheduled_at, related_invoice_id,
                  subject, body, pause_on_reply, cancel_if_paid, retry_count,
                  max_retries, last_error, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                i.id,
                i.owner_id,
                i.client_id,
                i.status.to_string(),
                ts(i.scheduled_at),
                i.related_invoice_id,
                i.subject,
                i.body,
                i.pause_on_reply,
                i.cancel_if_paid,
                i.retry_count,
                i.max_retries,
                i.last_error,
                ts(i.created_at),
            ],
        )?;
        Ok(())
    })
    .await
}

/// Fetch a queue item by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<FollowupQueueItem>, CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.query_row(
            &format!("SELECT {COLS} FROM followup_queue WHERE id = ?1"),
            params![id],
            row_to_item,
        )
        .optional()
    })
    .await
}

/// List items due for dispatch, including stale-claimed rows.
pub async fn list_due(
    db: &Database,
    now: DateTime<Utc>,
    stale_before: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<FollowupQueueItem>, CadentError> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLS} FROM followup_queue
              WHERE (status = 'queued' AND scheduled_at <= ?1)
                 OR (status = 'sending' AND claimed_at <= ?2)
              ORDER BY scheduled_at ASC
              LIMIT ?3"
        ))?;
        let rows = stmt.query_map(params![ts(now), ts(stale_before), limit], row_to_item)?;
        rows.collect()
    })
    .await
}

/// Atomically claim an item before sending. Returns false when another
/// invocation already owns it.
pub async fn claim(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
    stale_before: DateTime<Utc>,
) -> Result<bool, CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        let changed = conn.execute(
            "UPDATE followup_queue
                SET status = 'sending', claimed_at = ?2
              WHERE id = ?1
                AND (status = 'queued'
                     OR (status = 'sending' AND claimed_at <= ?3))",
            params![id, ts(now), ts(stale_before)],
        )?;
        Ok(changed > 0)
    })
    .await
}

/// Terminal transition to `sent`.
pub async fn mark_sent(db: &Database, id: &str) -> Result<(), CadentError> {
    set_claimed_status(db, id, "sent").await
}

/// Suppression outcome: paused until the client-reply condition clears.
pub async fn mark_paused(db: &Database, id: &str) -> Result<(), CadentError> {
    set_claimed_status(db, id, "paused").await
}

/// Suppression outcome: terminal cancel.
pub async fn mark_cancelled(db: &Database, id: &str) -> Result<(), CadentError> {
    set_claimed_status(db, id, "cancelled").await
}

/// Suppression outcome: explicit skip (client unsubscribed or paused).
pub async fn mark_skipped(db: &Database, id: &str) -> Result<(), CadentError> {
    set_claimed_status(db, id, "skipped").await
}

async fn set_claimed_status(db: &Database, id: &str, status: &str) -> Result<(), CadentError> {
    let id = id.to_string();
    let status = status.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE followup_queue
                SET status = ?2, claimed_at = NULL
              WHERE id = ?1 AND status = 'sending'",
            params![id, status],
        )?;
        Ok(())
    })
    .await
}

/// Record a failed delivery attempt. Increments the retry counter and
/// requeues the item, or marks it terminally `failed` once the retry
/// budget is exhausted. Returns the resulting status.
pub async fn record_failure(
    db: &Database,
    id: &str,
    error: &str,
) -> Result<QueueItemStatus, CadentError> {
    let id = id.to_string();
    let error = error.to_string();
    db.call(move |conn| {
        let (retry_count, max_retries): (u32, u32) = conn.query_row(
            "SELECT retry_count, max_retries FROM followup_queue WHERE id = ?1",
            params![&id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let new_count = retry_count + 1;
        let status = if new_count >= max_retries {
            QueueItemStatus::Failed
        } else {
            QueueItemStatus::Queued
        };
        conn.execute(
            "UPDATE followup_queue
                SET status = ?2, retry_count = ?3, last_error = ?4, claimed_at = NULL
              WHERE id = ?1 AND status = 'sending'",
            params![id, status.to_string(), new_count, error],
        )?;
        Ok(status)
    })
    .await
}

/// Cancel every queued item for a client (bounce/complaint/unsubscribe
/// auto-suppression). Returns the number of items cancelled.
pub async fn cancel_queued_for_client(
    db: &Database,
    client_id: &str,
) -> Result<usize, CadentError> {
    let client_id = client_id.to_string();
    db.call(move |conn| {
        let changed = conn.execute(
            "UPDATE followup_queue SET status = 'cancelled', claimed_at = NULL
              WHERE client_id = ?1 AND status = 'queued'",
            params![client_id],
        )?;
        Ok(changed)
    })
    .await
}
