// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reincarnated check`: validate a rule file

use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use rn_core::{Clock, SystemClock};
use rn_rules::{CronExpr, GlobalSchedule};
use rn_daemon::Config;

use crate::exit_error::{ExitError, INVALID_CONFIG};

#[derive(Args)]
pub struct CheckArgs {
    /// Rule file (defaults to RN_CONFIG, then <state>/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn handle(args: CheckArgs) -> Result<()> {
    let path = match args.config {
        Some(path) => path,
        None => Config::load()?.config_path,
    };
    let schedule = rn_rules::load_config(&path)
        .map_err(|e| ExitError::new(INVALID_CONFIG, format!("{}: {e}", path.display())))?;
    print!("{}", summary(&path, &schedule, SystemClock.now()));
    Ok(())
}

/// Human-readable description of a loaded schedule.
pub fn summary(path: &Path, schedule: &GlobalSchedule, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}: ok", path.display());
    let _ = writeln!(out, "  active:           {}", schedule.active);
    let cron = match schedule.cron_expression.as_deref() {
        None => "-".to_string(),
        Some(expr) => match CronExpr::parse(expr) {
            Ok(_) => expr.to_string(),
            Err(e) => format!("{expr} (ignored: {e})"),
        },
    };
    let _ = writeln!(out, "  cron:             {cron}");
    let _ = writeln!(out, "  no_change:        {}", schedule.restart_unchanged_jobs_enabled);
    let _ = writeln!(out, "  include_unstable: {}", schedule.include_unstable);
    if schedule.max_depth > 0 {
        let _ = writeln!(out, "  max_depth:        {}", schedule.max_depth);
    }
    match schedule.next_fire_after(now) {
        Some(next) => {
            let _ = writeln!(out, "  next fire:        {}", next.to_rfc3339());
        }
        None => {
            let _ = writeln!(out, "  next fire:        never");
        }
    }

    let _ = writeln!(out, "  rules:            {}", schedule.rules.len());
    for (index, rule) in schedule.rules.iter().enumerate() {
        let _ = write!(out, "    {}. {} {:?}", index + 1, rule.kind.tag(), rule.description);
        if let Some(expr) = &rule.cron_override {
            if CronExpr::parse(expr).is_ok() {
                let _ = write!(out, " cron={expr:?}");
            } else {
                let _ = write!(out, " cron={expr:?} (ignored)");
            }
        }
        if rule.node_action.is_some() {
            let _ = write!(out, " node_action");
        } else if rule.master_action.is_some() {
            let _ = write!(out, " master_action");
        }
        if rule.is_no_change() && !schedule.restart_unchanged_jobs_enabled {
            let _ = write!(out, " (disabled)");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
