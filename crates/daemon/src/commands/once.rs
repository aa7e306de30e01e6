// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reincarnated once`: run a single tick against the state directory

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use rn_core::{truncate_to_minute, truncate_to_second, Clock, SystemClock};
use rn_daemon::{run_once, Config, LifecycleError};

use crate::exit_error::{ExitError, DAEMON_RUNNING};

#[derive(Args)]
pub struct OnceArgs {
    /// Tick instant as RFC 3339 (defaults to the start of the current minute)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

pub async fn handle(args: OnceArgs) -> Result<()> {
    let config = Config::load()?;
    let at = match args.at {
        Some(at) => truncate_to_second(at),
        None => truncate_to_minute(SystemClock.now()),
    };

    let report = match run_once(&config, at).await {
        Ok(report) => report,
        Err(LifecycleError::LockFailed(_)) => {
            return Err(ExitError::new(
                DAEMON_RUNNING,
                format!("a daemon is running for {}; stop it first", config.state_dir.display()),
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
