// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email delivery for the Cadent follow-up engine.
//!
//! An ordered chain of delivery providers (SMTP, HTTP mail API, terminal
//! sandbox) with per-provider retry, exponential backoff, per-attempt
//! timeouts, and fallback.

pub mod chain;
pub mod http;
pub mod sandbox;
pub mod smtp;

pub use chain::{DeliveryChain, RetryPolicy};
pub use http::{HttpApiOptions, HttpApiProvider};
pub use sandbox::SandboxProvider;
pub use smtp::{SmtpOptions, SmtpProvider};
