// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reincarnated run`: the long-lived daemon

use anyhow::Result;
use rn_daemon::{logging, startup, Config};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn handle() -> Result<()> {
    let config = Config::load()?;
    let _guard = logging::init_file(&config.log_path)?;
    info!(state_dir = %config.state_dir.display(), "starting reincarnation daemon");

    let daemon = startup(&config).await?;
    let shutdown = CancellationToken::new();
    cancel_on_signal(shutdown.clone())?;
    daemon.run(shutdown).await?;
    Ok(())
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
fn cancel_on_signal(shutdown: CancellationToken) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT"),
            _ = sigterm.recv() => info!("received SIGTERM"),
        }
        shutdown.cancel();
    });
    Ok(())
}
