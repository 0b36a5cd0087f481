// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invoice reads. Invoices are written by the billing side of the house;
//! this engine only consults their status during suppression.

use std::str::FromStr;

use rusqlite::{params, OptionalExtension};

use cadent_core::CadentError;

use crate::database::{invalid_column, parse_ts, ts, Database};
use crate::models::{Invoice, InvoiceStatus};

fn row_to_invoice(row: &rusqlite::Row<'_>) -> Result<Invoice, rusqlite::Error> {
    let status: String = row.get(3)?;
    Ok(Invoice {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        client_id: row.get(2)?,
        status: InvoiceStatus::from_str(&status).map_err(|e| invalid_column(3, e))?,
        amount_cents: row.get(4)?,
        issued_at: parse_ts(5, row.get(5)?)?,
    })
}

/// Insert an invoice (used by tests and the composition boundary).
pub async fn insert(db: &Database, invoice: &Invoice) -> Result<(), CadentError> {
    let inv = invoice.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO invoices (id, owner_id, client_id, status, amount_cents, issued_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                inv.id,
                inv.owner_id,
                inv.client_id,
                inv.status.to_string(),
                inv.amount_cents,
                ts(inv.issued_at),
            ],
        )?;
        Ok(())
    })
    .await
}

/// Fetch an invoice by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Invoice>, CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.query_row(
            "SELECT id, owner_id, client_id, status, amount_cents, issued_at
               FROM invoices WHERE id = ?1",
            params![id],
            row_to_invoice,
        )
        .optional()
    })
    .await
}

/// Update an invoice's status (composition boundary; suppression re-reads
/// at dispatch time, so a payment flips the next cycle's decision).
pub async fn set_status(
    db: &Database,
    id: &str,
    status: InvoiceStatus,
) -> Result<(), CadentError> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE invoices SET status = ?2 WHERE id = ?1",
            params![id, status.to_string()],
        )?;
        Ok(())
    })
    .await
}
