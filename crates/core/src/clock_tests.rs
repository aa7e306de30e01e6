// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_returns_increasing_time() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let t2 = clock.now();
    assert!(t2 > t1);
}

#[test]
fn fake_clock_starts_on_minute_boundary() {
    let clock = FakeClock::new();
    assert_eq!(clock.now().second(), 0);
    assert_eq!(clock.now().nanosecond(), 0);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    clock.advance(TimeDelta::seconds(60));
    assert_eq!(clock.now() - t1, TimeDelta::seconds(60));
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(TimeDelta::seconds(30));
    assert_eq!(clock1.now() - t1, TimeDelta::seconds(30));
}

#[test]
fn truncation_helpers() {
    let t = DateTime::parse_from_rfc3339("2026-03-01T10:15:42.250Z").unwrap().with_timezone(&Utc);
    assert_eq!(truncate_to_second(t).to_rfc3339(), "2026-03-01T10:15:42+00:00");
    assert_eq!(truncate_to_minute(t).to_rfc3339(), "2026-03-01T10:15:00+00:00");
}
