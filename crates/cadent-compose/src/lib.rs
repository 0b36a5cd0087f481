// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content generation for the Cadent follow-up engine.
//!
//! Wraps the generation-service HTTP boundary with per-owner rate
//! limiting, prompt/instruction assembly, a temperature ramp for repeat
//! messages, and output validation.

pub mod client;
pub mod generator;
pub mod limiter;
pub mod prompt;

pub use client::GenerationClient;
pub use generator::Composer;
pub use limiter::SlidingWindowLimiter;
