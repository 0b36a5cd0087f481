// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only delivery analytics log. No update or delete paths exist on
//! purpose.

use std::str::FromStr;

use rusqlite::params;

use cadent_core::CadentError;

use crate::database::{invalid_column, parse_ts, ts, Database};
use crate::models::{AnalyticsEvent, AnalyticsEventKind, BounceKind};

fn row_to_event(row: &rusqlite::Row<'_>) -> Result<AnalyticsEvent, rusqlite::Error> {
    let event: String = row.get(4)?;
    let bounce_kind: Option<String> = row.get(5)?;
    Ok(AnalyticsEvent {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        client_id: row.get(2)?,
        message_id: row.get(3)?,
        event: AnalyticsEventKind::from_str(&event).map_err(|e| invalid_column(4, e))?,
        bounce_kind: bounce_kind
            .map(|k| BounceKind::from_str(&k).map_err(|e| invalid_column(5, e)))
            .transpose()?,
        data: row.get(6)?,
        created_at: parse_ts(7, row.get(7)?)?,
    })
}

/// Append an event to the log.
pub async fn append(db: &Database, event: &AnalyticsEvent) -> Result<(), CadentError> {
    let e = event.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO analytics_events
                 (id, owner_id, client_id, message_id, event, bounce_kind, data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                e.id,
                e.owner_id,
                e.client_id,
                e.message_id,
                e.event.to_string(),
                e.bounce_kind.map(|k| k.to_string()),
                e.data,
                ts(e.created_at),
            ],
        )?;
        Ok(())
    })
    .await
}

/// Events for one client, newest first.
pub async fn list_for_client(
    db: &Database,
    client_id: &str,
    limit: u32,
) -> Result<Vec<AnalyticsEvent>, CadentError> {
    let client_id = client_id.to_string();
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, client_id, message_id, event, bounce_kind, data, created_at
               FROM analytics_events
              WHERE client_id = ?1
              ORDER BY created_at DESC
              LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![client_id, limit], row_to_event)?;
        rows.collect()
    })
    .await
}
