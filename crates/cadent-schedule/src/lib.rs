// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure scheduling logic: recurrence computation and suppression
//! evaluation. No I/O lives in this crate; both functions are driven
//! entirely by their inputs so the dispatcher can test them in isolation.

pub mod recurrence;
pub mod suppression;

pub use recurrence::next_run;
pub use suppression::{evaluate, SuppressionDecision, SuppressionInputs, SuppressionReason};
