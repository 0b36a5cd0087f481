// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the engine and its external collaborators.

pub mod generator;
pub mod limiter;
pub mod provider;
pub mod renderer;

pub use generator::ContentGenerator;
pub use limiter::RateLimiter;
pub use provider::DeliveryProvider;
pub use renderer::{DocumentRenderer, NoopRenderer};
