// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity. The atomic claim steps used by
//! the dispatcher live next to the entities they guard.

pub mod campaigns;
pub mod clients;
pub mod events;
pub mod invoices;
pub mod messages;
pub mod queue;
