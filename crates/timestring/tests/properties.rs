//! Property-based tests for range resolution.
//!
//! Reference clocks are drawn from 1990-2090 in UTC and Asia/Kolkata; counts
//! stay small so results never leave chrono's range.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use proptest::prelude::*;
use timestring::calendar::{add_months, add_years};
use timestring::grammar::Direction;
use timestring::resolver::weekday_offset;
use timestring::{parse_range_with_clock, ReferenceClock, WeekWindow};

// ============================================================================
// Strategies
// ============================================================================

fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
    // 1990-01-01 .. 2090-01-01
    (631_152_000i64..3_786_825_600i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn arb_tz() -> impl Strategy<Value = Tz> {
    prop_oneof![Just(Tz::UTC), Just(Tz::Asia__Kolkata)]
}

fn arb_clock() -> impl Strategy<Value = ReferenceClock> {
    (arb_now(), arb_tz()).prop_map(|(now, tz)| ReferenceClock::new(now, tz))
}

fn arb_weekday() -> impl Strategy<Value = Weekday> {
    (0u8..7).prop_map(|n| Weekday::try_from(n).unwrap())
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::None),
        Just(Direction::This),
        Just(Direction::Next),
        Just(Direction::Last),
    ]
}

fn arb_expression() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..48, prop_oneof![Just("hours"), Just("days"), Just("weeks")])
            .prop_map(|(n, unit)| format!("next {n} {unit}")),
        (1u32..48, prop_oneof![Just("months"), Just("years")])
            .prop_map(|(n, unit)| format!("last {n} {unit}")),
        prop_oneof![
            Just("today".to_string()),
            Just("tomorrow".to_string()),
            Just("yesterday".to_string()),
            Just("this month".to_string()),
            Just("next year".to_string()),
            Just("last week".to_string()),
            Just("next monday".to_string()),
            Just("last sunday".to_string()),
            Just("December".to_string()),
            Just("from 2 PM to 4PM".to_string()),
        ],
    ]
}

fn parse(text: &str, clock: &ReferenceClock) -> timestring::Range {
    parse_range_with_clock(text, clock, WeekWindow::Rolling)
        .unwrap_or_else(|e| panic!("'{text}' failed: {e}"))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every produced range is non-empty.
    #[test]
    fn start_before_end(clock in arb_clock(), text in arb_expression()) {
        let range = parse(&text, &clock);
        prop_assert!(range.start() < range.end());
    }

    /// Parsing is a pure function of text and clock.
    #[test]
    fn repeat_parse_is_identical(clock in arb_clock(), text in arb_expression()) {
        prop_assert_eq!(parse(&text, &clock), parse(&text, &clock));
    }

    /// "next N months" ends at the calendar-aware addition of N months.
    #[test]
    fn counted_months_match_calendar_addition(now in arb_now(), n in 1u32..60) {
        let clock = ReferenceClock::new(now, Tz::UTC);
        let range = parse(&format!("next {n} months"), &clock);
        let expected = add_months(now.date_naive(), i64::from(n)).unwrap();
        prop_assert_eq!(range.start(), clock.now());
        prop_assert_eq!(range.end().date_naive(), expected);
        prop_assert_eq!(range.end().time(), now.time());
    }

    /// "last N months" starts at the calendar-aware subtraction of N months.
    #[test]
    fn counted_months_backwards_match_calendar_subtraction(now in arb_now(), n in 1u32..60) {
        let clock = ReferenceClock::new(now, Tz::UTC);
        let range = parse(&format!("last {n} months"), &clock);
        let expected = add_months(now.date_naive(), -i64::from(n)).unwrap();
        prop_assert_eq!(range.end(), clock.now());
        prop_assert_eq!(range.start().date_naive(), expected);
        prop_assert_eq!(range.start().time(), now.time());
    }

    /// "next N years" ends at the calendar-aware addition of N years, so
    /// February 29 clamps to February 28 in a common year.
    #[test]
    fn counted_years_match_calendar_addition(now in arb_now(), n in 1u32..30) {
        let clock = ReferenceClock::new(now, Tz::UTC);
        let range = parse(&format!("next {n} years"), &clock);
        let expected = add_years(now.date_naive(), i64::from(n)).unwrap();
        prop_assert_eq!(range.end().date_naive(), expected);
        prop_assert_eq!(range.end().time(), now.time());

        let back = parse(&format!("last {n} years"), &clock);
        let expected = add_years(now.date_naive(), -i64::from(n)).unwrap();
        prop_assert_eq!(back.start().date_naive(), expected);
    }

    /// Day-of-month is kept, or clamped to the last day of the target month.
    #[test]
    fn add_months_clamps(
        year in 1900i32..2100,
        month in 1u32..=12,
        day in 1u32..=31,
        n in -36i64..36,
    ) {
        prop_assume!(NaiveDate::from_ymd_opt(year, month, day).is_some());
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let shifted = add_months(date, n).unwrap();
        let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
        prop_assert_eq!(months(shifted) - months(date), n);
        prop_assert!(shifted.day() <= day);
        if shifted.day() < day {
            // Clamped: must be the last day of its month
            prop_assert!(shifted.succ_opt().unwrap().day() == 1);
        }
    }

    /// Fixed units are exact durations.
    #[test]
    fn counted_days_are_fixed_duration(clock in arb_clock(), n in 1u32..400) {
        let range = parse(&format!("last {n} days"), &clock);
        prop_assert_eq!(range.end(), clock.now());
        prop_assert_eq!(range.duration(), Duration::days(i64::from(n)));
    }

    /// Seconds through weeks add exact durations in both directions.
    #[test]
    fn counted_fixed_units_are_exact(
        clock in arb_clock(),
        n in 1u32..200,
        (unit, seconds) in prop_oneof![
            Just(("seconds", 1i64)),
            Just(("minutes", 60)),
            Just(("hours", 3_600)),
            Just(("days", 86_400)),
            Just(("weeks", 604_800)),
        ],
    ) {
        let expected = Duration::seconds(seconds * i64::from(n));

        let next = parse(&format!("next {n} {unit}"), &clock);
        prop_assert_eq!(next.start(), clock.now());
        prop_assert_eq!(next.duration(), expected);

        let last = parse(&format!("last {n} {unit}"), &clock);
        prop_assert_eq!(last.end(), clock.now());
        prop_assert_eq!(last.duration(), expected);
    }

    /// The weekday offset lands on the target weekday within the window its
    /// modifier allows.
    #[test]
    fn weekday_offset_formula(
        target in arb_weekday(),
        today in arb_weekday(),
        direction in arb_direction(),
    ) {
        let offset = weekday_offset(target, today, direction);
        let landed = (i64::from(today.num_days_from_monday()) + offset).rem_euclid(7);
        prop_assert_eq!(landed, i64::from(target.num_days_from_monday()));
        match direction {
            Direction::None | Direction::This => prop_assert!((0..7).contains(&offset)),
            Direction::Next => prop_assert!((1..=7).contains(&offset)),
            Direction::Last => prop_assert!((-7..0).contains(&offset)),
        }
    }

    /// "next <today's weekday>" and "last <today's weekday>" shift a full week.
    #[test]
    fn same_weekday_shifts_seven_days(clock in arb_clock()) {
        let name = match clock.now().weekday() {
            Weekday::Mon => "monday",
            Weekday::Tue => "tuesday",
            Weekday::Wed => "wednesday",
            Weekday::Thu => "thursday",
            Weekday::Fri => "friday",
            Weekday::Sat => "saturday",
            Weekday::Sun => "sunday",
        };
        let next = parse(&format!("next {name}"), &clock);
        let last = parse(&format!("last {name}"), &clock);
        prop_assert_eq!(next.start(), clock.now() + Duration::days(7));
        prop_assert_eq!(last.start(), clock.now() - Duration::days(7));
    }

    /// Arbitrary text never panics: it parses or returns a typed error.
    #[test]
    fn arbitrary_text_never_panics(clock in arb_clock(), text in "[a-zA-Z0-9:,. ]{0,40}") {
        let _ = parse_range_with_clock(&text, &clock, WeekWindow::Rolling);
    }
}
