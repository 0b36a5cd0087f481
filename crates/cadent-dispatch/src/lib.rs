// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dispatch loop for the Cadent follow-up engine: due-item discovery,
//! atomic claims, suppression, content generation, delivery, and status
//! persistence, with per-item failure isolation.

pub mod dispatcher;
pub mod item;

pub use dispatcher::{DispatchConfig, Dispatcher};
pub use item::{DispatchSummary, ItemKind, ItemOutcome, ItemResult};
