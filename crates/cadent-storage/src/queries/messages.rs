// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot scheduled message queries, including the atomic claim step
//! the dispatcher runs before any send attempt.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use cadent_core::CadentError;

use crate::database::{invalid_column, parse_ts, parse_ts_opt, ts, Database};
use crate::models::{MessageStatus, ScheduledMessage};

const COLS: &str = "id, owner_id, client_id, status, scheduled_at, related_invoice_id, \
                    subject, body, sent_at, last_error, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<ScheduledMessage, rusqlite::Error> {
    let status: String = row.get(3)?;
    Ok(ScheduledMessage {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        client_id: row.get(2)?,
        status: MessageStatus::from_str(&status).map_err(|e| invalid_column(3, e))?,
        scheduled_at: parse_ts(4, row.get(4)?)?,
        related_invoice_id: row.get(5)?,
        subject: row.get(6)?,
        body: row.get(7)?,
        sent_at: parse_ts_opt(8, row.get(8)?)?,
        last_error: row.get(9)?,
        created_at: parse_ts(10, row.get(10)?)?,
    })
}

/// Insert a new scheduled message.
pub async fn insert(db: &Database, msg: &ScheduledMessage) -> Result<(), CadentError> {
    let m = msg.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO scheduled_messages
                 (id, owner_id, client_id, status, scheduled_at, related_invoice_id,
                  subject, body, sent_at, last_error, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                m.id,
                m.owner_id,
                m.client_id,
                m.status.to_string(),
                ts(m.scheduled_at),
                m.related_invoice_id,
                m.subject,
                m.body,
                m.sent_at.map(ts),
                m.last_error,
                ts(m.created_at),
            ],
        )?;
        Ok(())
    })
    .await
}

/// Fetch a message by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<ScheduledMessage>, CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.query_row(
            &format!("SELECT {COLS} FROM scheduled_messages WHERE id = ?1"),
            params![id],
            row_to_message,
        )
        .optional()
    })
    .await
}

/// List messages due for dispatch: draft/queued rows whose time has come,
/// plus `sending` rows whose claim lease has gone stale (a prior
/// invocation died mid-send).
pub async fn list_due(
    db: &Database,
    now: DateTime<Utc>,
    stale_before: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<ScheduledMessage>, CadentError> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLS} FROM scheduled_messages
              WHERE (status IN ('draft', 'queued') AND scheduled_at <= ?1)
                 OR (status = 'sending' AND claimed_at <= ?2)
              ORDER BY scheduled_at ASC
              LIMIT ?3"
        ))?;
        let rows = stmt.query_map(params![ts(now), ts(stale_before), limit], row_to_message)?;
        rows.collect()
    })
    .await
}

/// Atomically claim a message before sending. Returns false when another
/// invocation already owns it (zero rows affected).
pub async fn claim(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
    stale_before: DateTime<Utc>,
) -> Result<bool, CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        let changed = conn.execute(
            "UPDATE scheduled_messages
                SET status = 'sending', claimed_at = ?2
              WHERE id = ?1
                AND (status IN ('draft', 'queued')
                     OR (status = 'sending' AND claimed_at <= ?3))",
            params![id, ts(now), ts(stale_before)],
        )?;
        Ok(changed > 0)
    })
    .await
}

/// Terminal transition to `sent`. Guarded on the claim state so a
/// concurrent invocation can never double-finalize.
pub async fn mark_sent(db: &Database, id: &str, at: DateTime<Utc>) -> Result<(), CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE scheduled_messages
                SET status = 'sent', sent_at = ?2, last_error = NULL, claimed_at = NULL
              WHERE id = ?1 AND status = 'sending'",
            params![id, ts(at)],
        )?;
        Ok(())
    })
    .await
}

/// Terminal transition to `failed` with the delivery error recorded.
pub async fn mark_failed(db: &Database, id: &str, error: &str) -> Result<(), CadentError> {
    let id = id.to_string();
    let error = error.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE scheduled_messages
                SET status = 'failed', last_error = ?2, claimed_at = NULL
              WHERE id = ?1 AND status = 'sending'",
            params![id, error],
        )?;
        Ok(())
    })
    .await
}

/// Suppression outcome: terminal cancel.
pub async fn mark_cancelled(db: &Database, id: &str) -> Result<(), CadentError> {
    set_suppressed_status(db, id, "cancelled").await
}

/// Suppression outcome: explicit skip (client unsubscribed or paused).
pub async fn mark_skipped(db: &Database, id: &str) -> Result<(), CadentError> {
    set_suppressed_status(db, id, "skipped").await
}

async fn set_suppressed_status(db: &Database, id: &str, status: &str) -> Result<(), CadentError> {
    let id = id.to_string();
    let status = status.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE scheduled_messages
                SET status = ?2, claimed_at = NULL
              WHERE id = ?1 AND status = 'sending'",
            params![id, status],
        )?;
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::clients;
    use crate::test_support;
    use chrono::Duration;

    async fn setup() -> (Database, tempfile::TempDir, DateTime<Utc>) {
        let (db, dir) = test_support::open_db().await;
        clients::insert(&db, &test_support::client("client-1"))
            .await
            .unwrap();
        let now = Utc::now();
        (db, dir, now)
    }

    fn stale(now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::minutes(5)
    }

    #[tokio::test]
    async fn due_listing_honors_time_and_batch_bound() {
        let (db, _dir, now) = setup().await;

        for i in 0..4 {
            let mut m = test_support::message(&format!("msg-{i}"), "client-1", now);
            m.scheduled_at = now - Duration::minutes(10 - i);
            insert(&db, &m).await.unwrap();
        }
        // One in the future; must not be listed.
        let future = test_support::message("msg-future", "client-1", now + Duration::hours(1));
        insert(&db, &future).await.unwrap();

        let due = list_due(&db, now, stale(now), 3).await.unwrap();
        assert_eq!(due.len(), 3, "batch bound applies");
        assert_eq!(due[0].id, "msg-0", "oldest first");

        let all = list_due(&db, now, stale(now), 50).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|m| m.id != "msg-future"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn claim_is_exclusive_until_stale() {
        let (db, _dir, now) = setup().await;
        let msg = test_support::message("msg-1", "client-1", now - Duration::minutes(1));
        insert(&db, &msg).await.unwrap();

        assert!(claim(&db, "msg-1", now, stale(now)).await.unwrap());
        // Second claim loses: the row is already `sending` with a fresh lease.
        assert!(!claim(&db, "msg-1", now, stale(now)).await.unwrap());

        // A later invocation reclaims once the lease has gone stale.
        let later = now + Duration::minutes(10);
        assert!(claim(&db, "msg-1", later, stale(later)).await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sent_is_terminal() {
        let (db, _dir, now) = setup().await;
        let msg = test_support::message("msg-1", "client-1", now - Duration::minutes(1));
        insert(&db, &msg).await.unwrap();

        assert!(claim(&db, "msg-1", now, stale(now)).await.unwrap());
        mark_sent(&db, "msg-1", now).await.unwrap();

        let fetched = get(&db, "msg-1").await.unwrap().unwrap();
        assert_eq!(fetched.status, MessageStatus::Sent);
        assert!(fetched.sent_at.is_some());

        // No longer due, and no longer claimable.
        assert!(list_due(&db, now, stale(now), 10).await.unwrap().is_empty());
        assert!(!claim(&db, "msg-1", now, stale(now)).await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn failed_records_error() {
        let (db, _dir, now) = setup().await;
        let msg = test_support::message("msg-1", "client-1", now - Duration::minutes(1));
        insert(&db, &msg).await.unwrap();

        assert!(claim(&db, "msg-1", now, stale(now)).await.unwrap());
        mark_failed(&db, "msg-1", "every provider refused").await.unwrap();

        let fetched = get(&db, "msg-1").await.unwrap().unwrap();
        assert_eq!(fetched.status, MessageStatus::Failed);
        assert_eq!(fetched.last_error.as_deref(), Some("every provider refused"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn suppression_transitions_apply() {
        let (db, _dir, now) = setup().await;
        for id in ["msg-1", "msg-2"] {
            let msg = test_support::message(id, "client-1", now - Duration::minutes(1));
            insert(&db, &msg).await.unwrap();
            assert!(claim(&db, id, now, stale(now)).await.unwrap());
        }

        mark_cancelled(&db, "msg-1").await.unwrap();
        mark_skipped(&db, "msg-2").await.unwrap();

        assert_eq!(
            get(&db, "msg-1").await.unwrap().unwrap().status,
            MessageStatus::Cancelled
        );
        assert_eq!(
            get(&db, "msg-2").await.unwrap().unwrap().status,
            MessageStatus::Skipped
        );

        db.close().await.unwrap();
    }
}
