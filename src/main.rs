//! Pactline CLI - contract and milestone ledger
//!
//! Usage: pactline <COMMAND>
//!
//! Commands:
//!   contract   Create, show, list, update and delete contracts
//!   milestone  Add milestones and move them through their lifecycle
//!
//! Exit codes: 0 success, 2 not found / invalid input or transition,
//! 3 contract busy, 4 storage failure, 1 anything else.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use pactline::config::{apply_store, Config};
use pactline::presentation::cli::{Cli, Commands};
use pactline::presentation::{create_services, OutputFormat, Renderer};
use pactline::{telemetry, PactError};

use commands::CommandContext;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let renderer = Renderer::new(OutputFormat::from_json_flag(cli.json));

    match run(cli, renderer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = match err.downcast_ref::<PactError>() {
                Some(pact) => {
                    eprintln!("{}", renderer.error(pact));
                    pact.class().exit_code()
                }
                None => {
                    eprintln!("error: {:#}", err);
                    1
                }
            };
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: Cli, renderer: Renderer) -> Result<()> {
    let config = load_config(&cli)?;

    let ctx = CommandContext {
        services: create_services(&config),
        renderer,
    };

    match cli.command {
        Commands::Contract(command) => commands::contract::run(&ctx, command),
        Commands::Milestone(command) => commands::milestone::run(&ctx, command),
    }
}

/// File, then environment, then command-line flags
fn load_config(cli: &Cli) -> Result<Config> {
    let (mut config, warnings) = Config::discover(cli.config.as_deref())?;

    if let Some(store) = &cli.store {
        apply_store(&mut config, store);
    }
    if let Some(ms) = cli.lock_timeout_ms {
        config.locking.timeout_ms = ms;
    }

    telemetry::init(cli.verbose, &config.logging);
    for warning in &warnings {
        eprintln!("warning: {}", warning);
    }
    debug!(backend = ?config.storage.backend, "configuration loaded");

    Ok(config)
}
