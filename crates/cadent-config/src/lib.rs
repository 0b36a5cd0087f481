// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for the Cadent follow-up engine.
//!
//! TOML files in the XDG hierarchy merged with `CADENT_*` environment
//! overrides, strict unknown-key rejection, and collected validation
//! errors rendered as miette diagnostics.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use model::CadentConfig;

/// Load the configuration from the standard hierarchy and validate it.
///
/// Returns all collected errors rather than failing on the first one.
pub fn load_and_validate() -> Result<CadentConfig, Vec<ConfigError>> {
    let config = loader::load_config().map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}
