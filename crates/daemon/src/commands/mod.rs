// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reincarnated` subcommands

pub mod check;
pub mod once;
pub mod run;
