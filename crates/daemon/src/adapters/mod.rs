// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete host adapters

mod fs_host;

pub use fs_host::{FsHost, RestartRecord};
