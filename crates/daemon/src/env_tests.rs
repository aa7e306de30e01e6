// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use yare::parameterized;

fn clear() {
    for var in [
        "RN_STATE_DIR",
        "RN_CONFIG",
        "RN_TICK_MS",
        "RN_JOB_TIMEOUT_MS",
        "RN_IN_FLIGHT_TIMEOUT_MS",
        "RN_COMPLETION_POLL_MS",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn state_dir_prefers_explicit_override() {
    clear();
    std::env::set_var("RN_STATE_DIR", "/srv/reincarnation");
    std::env::set_var("XDG_STATE_HOME", "/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/srv/reincarnation"));
    std::env::remove_var("RN_STATE_DIR");
}

#[test]
#[serial]
fn state_dir_falls_back_to_xdg() {
    clear();
    let saved = std::env::var("XDG_STATE_HOME").ok();
    std::env::set_var("XDG_STATE_HOME", "/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/xdg/reincarnation"));
    match saved {
        Some(value) => std::env::set_var("XDG_STATE_HOME", value),
        None => std::env::remove_var("XDG_STATE_HOME"),
    }
}

#[test]
#[serial]
fn config_path_defaults_into_state_dir() {
    clear();
    assert_eq!(config_path(Path::new("/state")), PathBuf::from("/state/config.toml"));
    std::env::set_var("RN_CONFIG", "/etc/reincarnation.toml");
    assert_eq!(config_path(Path::new("/state")), PathBuf::from("/etc/reincarnation.toml"));
    std::env::remove_var("RN_CONFIG");
}

#[parameterized(
    unset = { None, 60_000 },
    explicit = { Some("1500"), 1_500 },
    padded = { Some(" 250 "), 250 },
    zero_ignored = { Some("0"), 60_000 },
    garbage_ignored = { Some("soon"), 60_000 },
)]
#[serial]
fn tick_period_from_env(value: Option<&str>, expected_ms: u64) {
    clear();
    if let Some(value) = value {
        std::env::set_var("RN_TICK_MS", value);
    }
    assert_eq!(tick_period(), Duration::from_millis(expected_ms));
    std::env::remove_var("RN_TICK_MS");
}

#[test]
#[serial]
fn timeouts_have_defaults() {
    clear();
    assert_eq!(job_timeout(), Duration::from_secs(30));
    assert_eq!(in_flight_timeout(), Duration::from_secs(6 * 3600));
    assert_eq!(completion_poll(), Duration::from_secs(5));

    std::env::set_var("RN_IN_FLIGHT_TIMEOUT_MS", "60000");
    assert_eq!(in_flight_timeout(), Duration::from_secs(60));
    clear();
}
