// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client CRUD and trust-signal mutations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use cadent_core::CadentError;

use crate::database::{parse_ts, parse_ts_opt, ts, Database};
use crate::models::Client;

const COLS: &str = "id, owner_id, name, email, bounce_count, soft_bounce_count, \
                    last_bounce_at, followups_paused, unsubscribed, last_reply_at, \
                    engagement_score, created_at";

fn row_to_client(row: &rusqlite::Row<'_>) -> Result<Client, rusqlite::Error> {
    Ok(Client {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        bounce_count: row.get(4)?,
        soft_bounce_count: row.get(5)?,
        last_bounce_at: parse_ts_opt(6, row.get(6)?)?,
        followups_paused: row.get(7)?,
        unsubscribed: row.get(8)?,
        last_reply_at: parse_ts_opt(9, row.get(9)?)?,
        engagement_score: row.get(10)?,
        created_at: parse_ts(11, row.get(11)?)?,
    })
}

/// Insert a new client.
pub async fn insert(db: &Database, client: &Client) -> Result<(), CadentError> {
    let c = client.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO clients (id, owner_id, name, email, bounce_count, soft_bounce_count,
                                  last_bounce_at, followups_paused, unsubscribed, last_reply_at,
                                  engagement_score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                c.id,
                c.owner_id,
                c.name,
                c.email,
                c.bounce_count,
                c.soft_bounce_count,
                c.last_bounce_at.map(ts),
                c.followups_paused,
                c.unsubscribed,
                c.last_reply_at.map(ts),
                c.engagement_score,
                ts(c.created_at),
            ],
        )?;
        Ok(())
    })
    .await
}

/// Fetch a client by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Client>, CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.query_row(
            &format!("SELECT {COLS} FROM clients WHERE id = ?1"),
            params![id],
            row_to_client,
        )
        .optional()
    })
    .await
}

/// Persist the trust-signal fields maintained by the engagement tracker.
pub async fn save_signals(db: &Database, client: &Client) -> Result<(), CadentError> {
    let c = client.clone();
    db.call(move |conn| {
        conn.execute(
            "UPDATE clients
                SET bounce_count = ?2, soft_bounce_count = ?3, last_bounce_at = ?4,
                    followups_paused = ?5, unsubscribed = ?6, last_reply_at = ?7,
                    engagement_score = ?8
              WHERE id = ?1",
            params![
                c.id,
                c.bounce_count,
                c.soft_bounce_count,
                c.last_bounce_at.map(ts),
                c.followups_paused,
                c.unsubscribed,
                c.last_reply_at.map(ts),
                c.engagement_score,
            ],
        )?;
        Ok(())
    })
    .await
}

/// Record a client reply at `at`.
pub async fn record_reply(
    db: &Database,
    id: &str,
    at: DateTime<Utc>,
) -> Result<(), CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE clients SET last_reply_at = ?2 WHERE id = ?1",
            params![id, ts(at)],
        )?;
        Ok(())
    })
    .await
}

/// Manual reactivation: clear the pause, reset bounce accounting, and
/// restore the default engagement score.
pub async fn reactivate(db: &Database, id: &str) -> Result<(), CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE clients
                SET followups_paused = 0, bounce_count = 0, soft_bounce_count = 0,
                    engagement_score = 50
              WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    })
    .await
}
