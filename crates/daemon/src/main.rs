// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reincarnated: restarts failed build jobs on a schedule

mod commands;
mod exit_error;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{check::CheckArgs, once::OnceArgs};
use exit_error::ExitError;
use rn_daemon::logging;

#[derive(Parser)]
#[command(name = "reincarnated", version, about = "Periodically restart failed build jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the supervisor loop until SIGINT or SIGTERM
    Run,
    /// Validate a rule file and print a summary
    Check(CheckArgs),
    /// Run a single tick and print its report as JSON
    Once(OnceArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run => commands::run::handle().await,
        Command::Check(args) => {
            logging::init_stderr("warn");
            commands::check::handle(args)
        }
        Command::Once(args) => {
            logging::init_stderr("info");
            commands::once::handle(args).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("error: {exit}");
                ExitCode::from(exit.code)
            }
            None => {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}
