// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rn-rules: Trigger rules, cron evaluation, and supervisor configuration

pub mod cron;
mod error;
mod parse;
mod rule;
mod schedule;

pub use cron::{CronError, CronExpr};
pub use error::ConfigError;
pub use parse::{load_config, parse_config};
pub use rule::{Evidence, RuleKind, TriggerRule};
pub use schedule::{GlobalSchedule, ScheduleHandle};
