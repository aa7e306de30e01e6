// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading supervisor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("{kind} rule requires a non-empty value")]
    EmptyValue { kind: &'static str },

    #[error("unknown rule kind '{0}' (expected regex, failure_cause, or no_change)")]
    UnknownKind(String),

    #[error("rule #{index}: {source}")]
    Rule {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
