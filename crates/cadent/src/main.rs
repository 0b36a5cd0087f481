// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cadent - automated client follow-up scheduling and delivery engine.
//!
//! This is the binary entry point.

use clap::{Parser, Subcommand};

mod serve;

/// Cadent - automated client follow-up scheduling and delivery engine.
#[derive(Parser, Debug)]
#[command(name = "cadent", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway server hosting the dispatch trigger endpoints.
    Serve,
    /// Run one dispatch cycle (messages, campaigns, and the followup
    /// queue) and print the summary as JSON.
    Dispatch,
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cadent_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            cadent_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Dispatch) => serve::run_dispatch(config).await,
        Some(Commands::Config) => {
            serve::print_config(&config);
            Ok(())
        }
        None => {
            println!("cadent: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
