// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounce classification from provider error text.
//!
//! Providers report failures as SMTP reply text or API error strings;
//! permanent (5xx-class) failures count as hard bounces, everything else
//! as soft.

use cadent_core::types::BounceKind;

const HARD_MARKERS: &[&str] = &[
    "550",
    "551",
    "553",
    "user unknown",
    "no such user",
    "unknown recipient",
    "invalid recipient",
    "mailbox unavailable",
    "mailbox not found",
    "does not exist",
    "address rejected",
];

/// Classify a provider error string as a hard or soft bounce.
pub fn classify_bounce(error_text: &str) -> BounceKind {
    let lowered = error_text.to_lowercase();
    if HARD_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        BounceKind::Hard
    } else {
        BounceKind::Soft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_failures_are_hard() {
        assert_eq!(
            classify_bounce("550 5.1.1 No such user here"),
            BounceKind::Hard
        );
        assert_eq!(
            classify_bounce("Mailbox unavailable for ada@example.com"),
            BounceKind::Hard
        );
        assert_eq!(classify_bounce("551 user not local"), BounceKind::Hard);
    }

    #[test]
    fn transient_failures_are_soft() {
        assert_eq!(
            classify_bounce("421 4.7.0 Try again later"),
            BounceKind::Soft
        );
        assert_eq!(classify_bounce("connection reset by peer"), BounceKind::Soft);
        assert_eq!(classify_bounce("452 mailbox full"), BounceKind::Soft);
    }
}
