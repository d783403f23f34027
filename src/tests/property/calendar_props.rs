//! Property-based tests for the Imperial calendar.

use proptest::prelude::*;

use crate::core::calendar::{CalendarDate, CalendarEngine, CalendarSystem};

fn arb_date() -> impl Strategy<Value = CalendarDate> {
    (1i32..30_000, 1u32..=12, 1u32..=30).prop_map(|(year, month, day)| CalendarDate {
        year,
        month,
        day,
    })
}

proptest! {
    /// Property: render/parse round trip is the identity for valid dates.
    #[test]
    fn prop_round_trip(date in arb_date()) {
        let engine = CalendarEngine::new();
        let rendered = engine.render(&date, &CalendarSystem::Imperial);
        let parsed = engine.parse(&rendered, &CalendarSystem::Imperial).unwrap();
        prop_assert_eq!(parsed, date);
    }

    /// Property: days_between(d, add_days(d, n)) == |n| for any integer n.
    #[test]
    fn prop_add_days_inverse(date in arb_date(), n in -100_000i64..100_000) {
        let engine = CalendarEngine::new();
        let system = CalendarSystem::Imperial;
        let start = engine.render(&date, &system);
        let shifted = engine.add_days(&start, n, &system).unwrap();
        let distance = engine.days_between(&start, &shifted, &system).unwrap();
        prop_assert_eq!(distance, n.abs());
    }

    /// Property: adding 360 days advances the year by exactly one and leaves
    /// month and day unchanged.
    #[test]
    fn prop_year_length_invariant(date in arb_date()) {
        let engine = CalendarEngine::new();
        let system = CalendarSystem::Imperial;
        let start = engine.render(&date, &system);
        let shifted = engine.add_days(&start, 360, &system).unwrap();
        let parsed = engine.parse(&shifted, &system).unwrap();
        prop_assert_eq!(parsed.year, date.year + 1);
        prop_assert_eq!(parsed.month, date.month);
        prop_assert_eq!(parsed.day, date.day);
    }

    /// Property: add_days is additive (adding n then m equals adding n + m).
    #[test]
    fn prop_add_days_is_additive(
        date in arb_date(),
        n in -10_000i64..10_000,
        m in -10_000i64..10_000,
    ) {
        let engine = CalendarEngine::new();
        let system = CalendarSystem::Imperial;
        let start = engine.render(&date, &system);
        let two_steps = engine
            .add_days(&engine.add_days(&start, n, &system).unwrap(), m, &system)
            .unwrap();
        let one_step = engine.add_days(&start, n + m, &system).unwrap();
        prop_assert_eq!(two_steps, one_step);
    }

    /// Property: is_valid_date never panics on arbitrary input.
    #[test]
    fn prop_is_valid_date_total(input in ".{0,60}") {
        let engine = CalendarEngine::new();
        let _ = engine.is_valid_date(&input, &CalendarSystem::Imperial);
        let _ = engine.is_valid_date(&input, &CalendarSystem::Standard);
    }

    /// Property: format is lenient on arbitrary input (never panics, and
    /// unparseable input passes through unchanged).
    #[test]
    fn prop_format_total(input in "[a-zA-Z0-9 /,.]{0,40}") {
        let engine = CalendarEngine::new();
        let out = engine.format(&input, &CalendarSystem::Imperial);
        if !engine.is_valid_date(&input, &CalendarSystem::Imperial) {
            prop_assert_eq!(out, input);
        }
    }
}
