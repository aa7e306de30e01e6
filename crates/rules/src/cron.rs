// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron expression evaluation.
//!
//! Wraps the `cron` crate, which expects a seconds-first expression, and
//! accepts the standard 5-field form (`minute hour day-of-month month
//! day-of-week`) by normalizing it. Native 6/7-field expressions and
//! `@hourly`-style aliases pass through unchanged.

use chrono::{DateTime, TimeDelta, Utc};
use std::str::FromStr;
use thiserror::Error;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Errors from cron expression parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("cron expression is empty")]
    Empty,

    #[error("invalid cron expression '{expr}': {reason}")]
    Invalid { expr: String, reason: String },
}

/// A parsed cron recurrence.
#[derive(Debug, Clone)]
pub struct CronExpr {
    source: String,
    schedule: ::cron::Schedule,
}

impl CronExpr {
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let normalized = normalize(expr)?;
        let schedule = ::cron::Schedule::from_str(&normalized).map_err(|e| CronError::Invalid {
            expr: expr.trim().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { source: expr.trim().to_string(), schedule })
    }

    /// The expression as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Smallest fire instant at or after `t`.
    pub fn ceiling(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        // `after` is strictly-after; fire instants are whole seconds, so
        // stepping back one nanosecond makes `t` itself eligible.
        self.schedule.after(&(t - TimeDelta::nanoseconds(1))).next()
    }

    /// True iff `t` is itself a fire instant (zero distance to the ceiling).
    pub fn is_fire_instant(&self, t: DateTime<Utc>) -> bool {
        self.ceiling(t) == Some(t)
    }

    /// First fire instant strictly after `t`.
    pub fn next_after(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&t).next()
    }
}

impl std::fmt::Display for CronExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Convert a user-facing expression into the seconds-first form.
pub fn normalize(expr: &str) -> Result<String, CronError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(CronError::Empty);
    }
    if expr.starts_with('@') {
        return Ok(expr.to_string());
    }
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.as_slice() {
        [minute, hour, dom, month, dow] => {
            let dow = weekday_field(dow).map_err(|reason| CronError::Invalid {
                expr: expr.to_string(),
                reason,
            })?;
            Ok(format!("0 {minute} {hour} {dom} {month} {dow}"))
        }
        f if f.len() == 6 || f.len() == 7 => Ok(f.join(" ")),
        f => Err(CronError::Invalid {
            expr: expr.to_string(),
            reason: format!("expected 5 fields, got {}", f.len()),
        }),
    }
}

/// Rewrite a standard day-of-week field (0-7, 0 and 7 = Sunday) as names.
///
/// Numeric items and ranges are expanded to explicit name lists, which
/// sidesteps the library's 1-based ordinal convention and Sunday wrap.
fn weekday_field(field: &str) -> Result<String, String> {
    if field == "*" || field == "?" {
        return Ok(field.to_string());
    }
    let mut out: Vec<String> = Vec::new();
    for item in field.split(',') {
        let (range, step) = match item.split_once('/') {
            Some((r, s)) => {
                let step: usize =
                    s.parse().map_err(|_| format!("invalid day-of-week step '{s}'"))?;
                if step == 0 {
                    return Err("day-of-week step must be positive".to_string());
                }
                (r, step)
            }
            None => (item, 1),
        };
        let bounds = if range == "*" {
            Some((0, 6))
        } else if let Some((a, b)) = range.split_once('-') {
            match (a.parse::<usize>(), b.parse::<usize>()) {
                (Ok(a), Ok(b)) => Some((a, b)),
                _ => None,
            }
        } else {
            range.parse::<usize>().ok().map(|n| (n, if step > 1 { 6 } else { n }))
        };
        let Some((start, end)) = bounds else {
            // Names (MON, Mon-Fri) are understood by the library as is
            out.push(item.to_string());
            continue;
        };
        if start > 7 || end > 7 || start > end {
            return Err(format!("invalid day-of-week range '{range}'"));
        }
        for day in (start..=end).step_by(step) {
            let name = WEEKDAYS[day % 7].to_string();
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    Ok(out.join(","))
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
