// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Cadent follow-up engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, typed query
//! modules per entity, and the conditional-update claim steps that keep
//! concurrent dispatch invocations from double-sending an item.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use database::Database;
pub use store::Store;
