// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch result types shared by the three schedulable item kinds.
//!
//! One-shot messages, recurring campaigns, and followup queue items are
//! separate tables with separate lifecycles, but the dispatcher reports
//! them uniformly: one `ItemResult` per processed item, folded into a
//! `DispatchSummary`.

use serde::Serialize;
use strum::Display;

/// Which table a processed item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Message,
    Campaign,
    Queue,
}

/// What happened to one item during a dispatch cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    Sent {
        provider: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
    /// Suppressed, terminal.
    Cancelled { reason: String },
    /// Suppressed, reversible.
    Paused { reason: String },
    /// Suppressed, explicit skip status.
    Skipped { reason: String },
    /// Campaign reached its send budget or its recurrence ended.
    Completed,
    /// Failed but still within the retry budget.
    Requeued { error: String },
    Failed { error: String },
}

/// One processed item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    pub id: String,
    pub kind: ItemKind,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Aggregate counts for a dispatch invocation. Suppressions are normal
/// transitions, counted apart from failures.
#[derive(Debug, Default, Serialize)]
pub struct DispatchSummary {
    pub processed: u32,
    pub sent: u32,
    pub suppressed: u32,
    pub failed: u32,
    pub results: Vec<ItemResult>,
}

impl DispatchSummary {
    /// Fold one result into the counts.
    pub fn push(&mut self, result: ItemResult) {
        self.processed += 1;
        match &result.outcome {
            ItemOutcome::Sent { .. } => self.sent += 1,
            ItemOutcome::Cancelled { .. }
            | ItemOutcome::Paused { .. }
            | ItemOutcome::Skipped { .. } => self.suppressed += 1,
            ItemOutcome::Requeued { .. } | ItemOutcome::Failed { .. } => self.failed += 1,
            ItemOutcome::Completed => {}
        }
        self.results.push(result);
    }

    /// Merge another summary (e.g. the queue pass) into this one.
    pub fn merge(&mut self, other: DispatchSummary) {
        self.processed += other.processed;
        self.sent += other.sent;
        self.suppressed += other.suppressed;
        self.failed += other.failed;
        self.results.extend(other.results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_fold_by_outcome() {
        let mut summary = DispatchSummary::default();
        summary.push(ItemResult {
            id: "a".into(),
            kind: ItemKind::Message,
            outcome: ItemOutcome::Sent {
                provider: "smtp".into(),
                message_id: None,
            },
        });
        summary.push(ItemResult {
            id: "b".into(),
            kind: ItemKind::Message,
            outcome: ItemOutcome::Cancelled {
                reason: "invoice_paid".into(),
            },
        });
        summary.push(ItemResult {
            id: "c".into(),
            kind: ItemKind::Queue,
            outcome: ItemOutcome::Requeued {
                error: "timeout".into(),
            },
        });
        summary.push(ItemResult {
            id: "d".into(),
            kind: ItemKind::Campaign,
            outcome: ItemOutcome::Completed,
        });

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.suppressed, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn results_serialize_with_flat_outcome_tag() {
        let result = ItemResult {
            id: "msg-1".into(),
            kind: ItemKind::Message,
            outcome: ItemOutcome::Sent {
                provider: "sandbox".into(),
                message_id: Some("sandbox-1".into()),
            },
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"outcome\":\"sent\""));
        assert!(json.contains("\"kind\":\"message\""));
        assert!(json.contains("\"provider\":\"sandbox\""));
    }
}
