// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Suppression evaluation: the ordered decision table run over every due
//! item immediately before a send.
//!
//! The evaluator is re-run at dispatch time and never cached -- reply and
//! payment state can change between scheduling and the moment a send is
//! about to happen.

use chrono::{DateTime, Utc};
use strum::Display;

use cadent_core::types::{Client, Invoice, InvoiceStatus};

/// The suppression-relevant slice of a due item.
#[derive(Debug, Clone, Copy)]
pub struct SuppressionInputs {
    pub pause_on_reply: bool,
    pub cancel_if_paid: bool,
    pub scheduled_at: DateTime<Utc>,
}

/// Why a send was suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SuppressionReason {
    InvoicePaid,
    ClientReplied,
    ClientUnsubscribed,
    FollowupsPaused,
}

/// Outcome of the decision table. `Cancel` is terminal, `Pause` and
/// `Skip` keep the record and are reversible by explicit reactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionDecision {
    Proceed,
    Cancel(SuppressionReason),
    Pause(SuppressionReason),
    Skip(SuppressionReason),
}

impl SuppressionDecision {
    pub fn is_suppressed(&self) -> bool {
        !matches!(self, Self::Proceed)
    }
}

/// Evaluate the decision table, in order:
///
/// 1. `cancel_if_paid` and the related invoice is paid -> cancel.
/// 2. `pause_on_reply` and the client replied after the item was
///    scheduled -> pause.
/// 3. The client is unsubscribed or has follow-ups paused -> skip.
/// 4. Otherwise proceed.
pub fn evaluate(
    inputs: &SuppressionInputs,
    client: &Client,
    invoice: Option<&Invoice>,
) -> SuppressionDecision {
    if inputs.cancel_if_paid
        && invoice.is_some_and(|inv| inv.status == InvoiceStatus::Paid)
    {
        return SuppressionDecision::Cancel(SuppressionReason::InvoicePaid);
    }

    if inputs.pause_on_reply
        && client
            .last_reply_at
            .is_some_and(|replied| replied > inputs.scheduled_at)
    {
        return SuppressionDecision::Pause(SuppressionReason::ClientReplied);
    }

    if client.unsubscribed {
        return SuppressionDecision::Skip(SuppressionReason::ClientUnsubscribed);
    }
    if client.followups_paused {
        return SuppressionDecision::Skip(SuppressionReason::FollowupsPaused);
    }

    SuppressionDecision::Proceed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn client() -> Client {
        Client {
            id: "client-1".into(),
            owner_id: "owner-1".into(),
            name: "Ada Example".into(),
            email: "ada@example.com".into(),
            bounce_count: 0,
            soft_bounce_count: 0,
            last_bounce_at: None,
            followups_paused: false,
            unsubscribed: false,
            last_reply_at: None,
            engagement_score: 50,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn paid_invoice() -> Invoice {
        Invoice {
            id: "inv-1".into(),
            owner_id: "owner-1".into(),
            client_id: "client-1".into(),
            status: InvoiceStatus::Paid,
            amount_cents: 125_00,
            issued_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        }
    }

    fn scheduled_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn paid_invoice_cancels() {
        let inputs = SuppressionInputs {
            pause_on_reply: false,
            cancel_if_paid: true,
            scheduled_at: scheduled_at(),
        };
        let decision = evaluate(&inputs, &client(), Some(&paid_invoice()));
        assert_eq!(
            decision,
            SuppressionDecision::Cancel(SuppressionReason::InvoicePaid)
        );
        assert!(decision.is_suppressed());
    }

    #[test]
    fn paid_invoice_cancels_regardless_of_reply_state() {
        let inputs = SuppressionInputs {
            pause_on_reply: true,
            cancel_if_paid: true,
            scheduled_at: scheduled_at(),
        };
        let mut c = client();
        c.last_reply_at = Some(scheduled_at() + Duration::hours(1));
        let decision = evaluate(&inputs, &c, Some(&paid_invoice()));
        assert_eq!(
            decision,
            SuppressionDecision::Cancel(SuppressionReason::InvoicePaid)
        );
    }

    #[test]
    fn reply_after_scheduling_pauses() {
        let inputs = SuppressionInputs {
            pause_on_reply: true,
            cancel_if_paid: false,
            scheduled_at: scheduled_at(),
        };
        let mut c = client();
        c.last_reply_at = Some(scheduled_at() + Duration::minutes(1));
        assert_eq!(
            evaluate(&inputs, &c, None),
            SuppressionDecision::Pause(SuppressionReason::ClientReplied)
        );
    }

    #[test]
    fn reply_before_scheduling_does_not_pause() {
        let inputs = SuppressionInputs {
            pause_on_reply: true,
            cancel_if_paid: false,
            scheduled_at: scheduled_at(),
        };
        let mut c = client();
        c.last_reply_at = Some(scheduled_at() - Duration::days(2));
        assert_eq!(evaluate(&inputs, &c, None), SuppressionDecision::Proceed);
    }

    #[test]
    fn unsubscribed_client_skips() {
        let inputs = SuppressionInputs {
            pause_on_reply: false,
            cancel_if_paid: false,
            scheduled_at: scheduled_at(),
        };
        let mut c = client();
        c.unsubscribed = true;
        assert_eq!(
            evaluate(&inputs, &c, None),
            SuppressionDecision::Skip(SuppressionReason::ClientUnsubscribed)
        );
    }

    #[test]
    fn paused_client_skips() {
        let inputs = SuppressionInputs {
            pause_on_reply: false,
            cancel_if_paid: false,
            scheduled_at: scheduled_at(),
        };
        let mut c = client();
        c.followups_paused = true;
        assert_eq!(
            evaluate(&inputs, &c, None),
            SuppressionDecision::Skip(SuppressionReason::FollowupsPaused)
        );
    }

    #[test]
    fn unpaid_invoice_with_flags_proceeds() {
        let inputs = SuppressionInputs {
            pause_on_reply: true,
            cancel_if_paid: true,
            scheduled_at: scheduled_at(),
        };
        let mut invoice = paid_invoice();
        invoice.status = InvoiceStatus::Overdue;
        assert_eq!(
            evaluate(&inputs, &client(), Some(&invoice)),
            SuppressionDecision::Proceed
        );
    }
}
