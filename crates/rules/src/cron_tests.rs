// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[yare::parameterized(
    every_minute = { "* * * * *", "0 * * * * *" },
    trimmed      = { "  */5 * * * *  ", "0 */5 * * * *" },
    monday       = { "0 9 * * 1", "0 0 9 * * Mon" },
    sunday_zero  = { "0 9 * * 0", "0 0 9 * * Sun" },
    sunday_seven = { "0 9 * * 7", "0 0 9 * * Sun" },
    weekdays     = { "0 9 * * 1-5", "0 0 9 * * Mon,Tue,Wed,Thu,Fri" },
    wraps_sunday = { "0 9 * * 5-7", "0 0 9 * * Fri,Sat,Sun" },
    stepped      = { "0 9 * * */2", "0 0 9 * * Sun,Tue,Thu,Sat" },
    names        = { "0 9 * * MON-FRI", "0 0 9 * * MON-FRI" },
    six_fields   = { "30 * * * * *", "30 * * * * *" },
    alias        = { "@hourly", "@hourly" },
)]
fn normalize_expressions(input: &str, expected: &str) {
    assert_eq!(normalize(input).unwrap(), expected);
}

#[yare::parameterized(
    empty       = { "" },
    blank       = { "   " },
    too_few     = { "* * *" },
    too_many    = { "* * * * * * * *" },
    bad_range   = { "0 9 * * 5-2" },
    out_of_range = { "0 9 * * 8" },
    bad_minute  = { "61 * * * *" },
    garbage     = { "every minute please" },
)]
fn rejects_malformed(input: &str) {
    assert!(CronExpr::parse(input).is_err(), "expected '{input}' to be rejected");
}

#[test]
fn empty_is_distinguished() {
    assert_eq!(normalize(" ").unwrap_err(), CronError::Empty);
}

#[test]
fn every_minute_fires_only_on_whole_minutes() {
    let cron = CronExpr::parse("* * * * *").unwrap();
    assert!(cron.is_fire_instant(at("2026-01-05T09:00:00Z")));
    assert!(cron.is_fire_instant(at("2026-01-05T09:01:00Z")));
    assert!(!cron.is_fire_instant(at("2026-01-05T09:01:30Z")));
    assert!(!cron.is_fire_instant(at("2026-01-05T09:01:00.250Z")));
}

#[test]
fn ceiling_is_at_or_after() {
    let cron = CronExpr::parse("*/5 * * * *").unwrap();
    assert_eq!(cron.ceiling(at("2026-01-05T09:05:00Z")), Some(at("2026-01-05T09:05:00Z")));
    assert_eq!(cron.ceiling(at("2026-01-05T09:05:01Z")), Some(at("2026-01-05T09:10:00Z")));
    assert_eq!(cron.next_after(at("2026-01-05T09:05:00Z")), Some(at("2026-01-05T09:10:00Z")));
}

#[yare::parameterized(
    monday_hit      = { "0 9 * * 1",   "2026-01-05T09:00:00Z", true },
    tuesday_miss    = { "0 9 * * 1",   "2026-01-06T09:00:00Z", false },
    sunday_zero     = { "0 9 * * 0",   "2026-01-04T09:00:00Z", true },
    sunday_seven    = { "0 9 * * 7",   "2026-01-04T09:00:00Z", true },
    weekday_hit     = { "0 9 * * 1-5", "2026-01-09T09:00:00Z", true },
    saturday_miss   = { "0 9 * * 1-5", "2026-01-10T09:00:00Z", false },
    wrap_saturday   = { "0 9 * * 5-7", "2026-01-10T09:00:00Z", true },
    wrap_monday     = { "0 9 * * 5-7", "2026-01-05T09:00:00Z", false },
    wrong_hour      = { "0 9 * * *",   "2026-01-05T10:00:00Z", false },
    first_of_month  = { "0 0 1 * *",   "2026-02-01T00:00:00Z", true },
)]
fn weekday_and_calendar_fields(expr: &str, instant: &str, expected: bool) {
    let cron = CronExpr::parse(expr).unwrap();
    assert_eq!(cron.is_fire_instant(at(instant)), expected);
}

#[test]
fn display_shows_source_expression() {
    let cron = CronExpr::parse(" 0 9 * * 1 ").unwrap();
    assert_eq!(cron.to_string(), "0 9 * * 1");
    assert_eq!(cron.as_str(), "0 9 * * 1");
}

fn arb_expr() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop_oneof![
        Just(("* * * * *", "0 * * * * *")),
        Just(("*/15 * * * *", "0 */15 * * * *")),
        Just(("0 */2 * * *", "0 0 */2 * * *")),
        Just(("30 4 1,15 * *", "0 30 4 1,15 * *")),
        Just(("5 0 * 8 *", "0 5 0 * 8 *")),
    ]
}

proptest! {
    /// The 5-field form and its seconds-prefixed form agree on every instant.
    #[test]
    fn five_and_six_field_forms_agree(
        (five, six) in arb_expr(),
        secs in 1_767_225_600i64..1_798_761_600i64,
    ) {
        let t = DateTime::from_timestamp(secs, 0).unwrap();
        let a = CronExpr::parse(five).unwrap();
        let b = CronExpr::parse(six).unwrap();
        prop_assert_eq!(a.is_fire_instant(t), b.is_fire_instant(t));
    }

    /// A fire instant is exactly the ceiling of itself; anything else has a later ceiling.
    #[test]
    fn fire_instant_iff_ceiling_equals(
        (five, _) in arb_expr(),
        secs in 1_767_225_600i64..1_798_761_600i64,
    ) {
        let t = DateTime::from_timestamp(secs, 0).unwrap();
        let cron = CronExpr::parse(five).unwrap();
        let ceiling = cron.ceiling(t).unwrap();
        prop_assert!(ceiling >= t);
        prop_assert_eq!(cron.is_fire_instant(t), ceiling == t);
    }
}
