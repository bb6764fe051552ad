//! Resolve parsed clauses against a reference clock.
//!
//! Pure functions of `(clause, clock, week window)`: no hidden state, no
//! clock reads. Two families of arithmetic are used and never mixed up:
//!
//! - seconds through weeks are exact durations added to the instant;
//! - months and years move the wall-clock date in the reference timezone
//!   (see [`crate::calendar`]).
//!
//! # Conventions
//!
//! - Counted spans ("last 2 days", "next 3 weeks") are anchored at now and
//!   never snapped: "last 2 days" is exactly the 48 hours ending now, so it
//!   includes the current partial day.
//! - Weeks default to [`WeekWindow::Rolling`]: "this week" is `[now, now+7d)`
//!   and "next"/"last" shift it by exactly seven days.
//! - Named days and weekdays are one-day windows anchored at now's time of
//!   day: "tomorrow" is `[now+1d, now+2d)`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;

use crate::calendar::{add_months, add_years, first_of_month, first_of_year, shift_months};
use crate::clock::ReferenceClock;
use crate::config::{days_from_week_start, WeekWindow};
use crate::error::{ParseError, Result};
use crate::grammar::{Clause, DateFields, Direction, ParsedSpec, Strategy};
use crate::lexicon::Unit;
use crate::range::Range;

/// Signed day offset from `today` to the `target` weekday.
///
/// `raw = (target - today) mod 7`. Bare and `this` take `raw` (today counts),
/// `next` never returns 0, `last` is always negative.
pub fn weekday_offset(target: Weekday, today: Weekday, direction: Direction) -> i64 {
    let raw = (target.num_days_from_monday() as i64 - today.num_days_from_monday() as i64)
        .rem_euclid(7);
    match direction {
        Direction::None | Direction::This => raw,
        Direction::Next => {
            if raw > 0 {
                raw
            } else {
                7
            }
        }
        Direction::Last => {
            if raw > 0 {
                raw - 7
            } else {
                -7
            }
        }
    }
}

/// Move `dt` by `n` units: exact duration for fixed-length units, calendar
/// months for months and years.
pub fn offset(dt: &DateTime<Tz>, unit: Unit, n: i64) -> Result<DateTime<Tz>> {
    let out_of_range = || ParseError::semantic(format!("{n} {unit:?} is out of range"));
    match unit {
        Unit::Month => shift_months(dt, n),
        Unit::Year => shift_months(dt, n.checked_mul(12).ok_or_else(out_of_range)?),
        _ => {
            let seconds = unit
                .fixed_seconds()
                .and_then(|s| s.checked_mul(n))
                .ok_or_else(out_of_range)?;
            let delta = Duration::try_seconds(seconds).ok_or_else(out_of_range)?;
            dt.checked_add_signed(delta).ok_or_else(out_of_range)
        }
    }
}

fn days(dt: &DateTime<Tz>, n: i64) -> Result<DateTime<Tz>> {
    offset(dt, Unit::Day, n)
}

/// Resolver bound to one reference clock.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    clock: &'a ReferenceClock,
    week_window: WeekWindow,
}

impl<'a> Resolver<'a> {
    pub fn new(clock: &'a ReferenceClock, week_window: WeekWindow) -> Self {
        Self { clock, week_window }
    }

    /// Resolve a clause standing alone to its full range.
    ///
    /// # Errors
    ///
    /// [`ParseError::Semantic`] for impossible dates, out-of-range arithmetic,
    /// or a clause whose strategy does not fit its parsed form.
    pub fn span(&self, clause: &Clause) -> Result<Range> {
        match (clause.spec, clause.strategy) {
            (ParsedSpec::Literal(fields), Strategy::LiteralDate) => self.literal_span(&fields),
            (
                ParsedSpec::Relative {
                    direction,
                    unit,
                    count,
                },
                strategy,
            ) => match strategy {
                Strategy::CountedSpan => self.counted_span(direction, unit, count),
                Strategy::Weekday => self.weekday_span(direction, unit),
                Strategy::NamedDay => self.named_day_span(direction, count),
                Strategy::SnappedUnit => self.snapped_span(direction, unit),
                other => Err(mismatch(other)),
            },
            (ParsedSpec::Literal(_), other) => Err(mismatch(other)),
        }
    }

    /// Resolve one side of a two-sided range to a single instant.
    ///
    /// A literal side is its first instant (the date at midnight, or at its
    /// clock time); a relative side is the start of its own range.
    ///
    /// # Errors
    ///
    /// [`ParseError::Semantic`] for a literal with no date fields: sides do
    /// not inherit a date from each other.
    pub fn anchor(&self, clause: &Clause) -> Result<DateTime<Tz>> {
        let ParsedSpec::Literal(fields) = clause.spec else {
            return Ok(self.span(clause)?.start());
        };
        if !fields.has_date() {
            return Err(ParseError::semantic(
                "each side of a range needs its own date; only a time of day was given",
            ));
        }
        let year = fields.year.unwrap_or_else(|| self.clock.today().year());
        let date = calendar_date(year, fields.month.unwrap_or(1), fields.day.unwrap_or(1))?;
        match time_of(&fields)? {
            Some(time) => self.clock.at(date, time),
            None => self.clock.midnight(date),
        }
    }

    /// A clock-only literal placed on today's date.
    pub fn time_today(&self, fields: &DateFields) -> Result<DateTime<Tz>> {
        if fields.has_date() {
            return Err(ParseError::semantic("a time-of-day range cannot carry a date"));
        }
        let time = time_of(fields)?
            .ok_or_else(|| ParseError::semantic("a time-of-day range needs a clock time"))?;
        self.clock.at(self.clock.today(), time)
    }

    // ── Strategies ──────────────────────────────────────────────────────────

    fn counted_span(&self, direction: Direction, unit: Unit, count: u32) -> Result<Range> {
        let now = self.clock.now();
        let n = i64::from(count);
        match direction {
            Direction::Next => Range::new(now, offset(&now, unit, n)?),
            Direction::Last => Range::new(offset(&now, unit, -n)?, now),
            other => Err(ParseError::semantic(format!(
                "a counted span needs next or last, not {other:?}"
            ))),
        }
    }

    fn weekday_span(&self, direction: Direction, unit: Unit) -> Result<Range> {
        let Unit::Weekday(target) = unit else {
            return Err(mismatch(Strategy::Weekday));
        };
        let now = self.clock.now();
        let start = days(&now, weekday_offset(target, now.weekday(), direction))?;
        Range::new(start, days(&start, 1)?)
    }

    fn named_day_span(&self, direction: Direction, count: u32) -> Result<Range> {
        let n = i64::from(count);
        let shift = match direction {
            Direction::None | Direction::This => 0,
            Direction::Next => n,
            Direction::Last => -n,
        };
        let start = days(&self.clock.now(), shift)?;
        Range::new(start, days(&start, 1)?)
    }

    fn snapped_span(&self, direction: Direction, unit: Unit) -> Result<Range> {
        let shift: i64 = match direction {
            Direction::None | Direction::This => 0,
            Direction::Next => 1,
            Direction::Last => -1,
        };
        let today = self.clock.today();
        match unit {
            Unit::Month => {
                let first = first_of_month(today);
                self.midnight_range(add_months(first, shift), add_months(first, shift + 1))
            }
            Unit::Year => {
                let first = first_of_year(today);
                self.midnight_range(add_years(first, shift), add_years(first, shift + 1))
            }
            Unit::Week => self.week_span(shift),
            _ => Err(mismatch(Strategy::SnappedUnit)),
        }
    }

    fn week_span(&self, shift: i64) -> Result<Range> {
        match self.week_window {
            WeekWindow::Rolling => {
                let start = days(&self.clock.now(), 7 * shift)?;
                Range::new(start, days(&start, 7)?)
            }
            WeekWindow::Calendar(week_start) => {
                let today = self.clock.today();
                let back = days_from_week_start(today.weekday(), week_start) - 7 * shift;
                let start = today.checked_sub_signed(Duration::days(back));
                let end = start.and_then(|d| d.checked_add_signed(Duration::weeks(1)));
                self.midnight_range(start, end)
            }
        }
    }

    /// A literal resolves at the granularity of its most specific field.
    fn literal_span(&self, fields: &DateFields) -> Result<Range> {
        let today = self.clock.today();
        let year = fields.year.unwrap_or_else(|| today.year());

        let date = match (fields.month, fields.day) {
            (_, _) if !fields.has_date() => today,
            (Some(month), Some(day)) => calendar_date(year, month, day)?,
            (_, _) if fields.has_time() => {
                return Err(ParseError::semantic(
                    "a time of day needs a full date or none at all",
                ));
            }
            (None, None) => {
                let first = calendar_date(year, 1, 1)?;
                return self.midnight_range(Some(first), add_years(first, 1));
            }
            (Some(month), None) => {
                let first = calendar_date(year, month, 1)?;
                return self.midnight_range(Some(first), add_months(first, 1));
            }
            (None, Some(_)) => return Err(ParseError::semantic("a day needs a month")),
        };

        match time_of(fields)? {
            Some(time) => {
                let start = self.clock.at(date, time)?;
                let unit = if fields.second.is_some() {
                    Unit::Second
                } else if fields.minute.is_some() {
                    Unit::Minute
                } else {
                    Unit::Hour
                };
                Range::new(start, offset(&start, unit, 1)?)
            }
            None => {
                let next = date
                    .succ_opt()
                    .ok_or_else(|| ParseError::semantic("date out of range"))?;
                self.midnight_range(Some(date), Some(next))
            }
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    /// `[start 00:00, end 00:00)` in the reference timezone. `None` dates come
    /// from calendar arithmetic that left chrono's range.
    fn midnight_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Range> {
        let out_of_range = || ParseError::semantic("date out of range");
        let start = start.ok_or_else(out_of_range)?;
        let end = end.ok_or_else(out_of_range)?;
        Range::new(self.clock.midnight(start)?, self.clock.midnight(end)?)
    }
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ParseError::semantic(format!(
            "{year:04}-{month:02}-{day:02} is not a calendar date"
        ))
    })
}

fn time_of(fields: &DateFields) -> Result<Option<NaiveTime>> {
    let Some(hour) = fields.hour else {
        return Ok(None);
    };
    let minute = fields.minute.unwrap_or(0);
    let second = fields.second.unwrap_or(0);
    NaiveTime::from_hms_opt(hour, minute, second)
        .map(Some)
        .ok_or_else(|| {
            ParseError::semantic(format!(
                "{hour:02}:{minute:02}:{second:02} is not a time of day"
            ))
        })
}

fn mismatch(strategy: Strategy) -> ParseError {
    ParseError::semantic(format!("{strategy:?} does not apply to this expression"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeekStartDay;
    use crate::error::ErrorKind;
    use chrono::{TimeZone, Utc};

    fn clock() -> ReferenceClock {
        // Friday, June 16, 2017, 19:37:22 UTC
        ReferenceClock::new(Utc.with_ymd_and_hms(2017, 6, 16, 19, 37, 22).unwrap(), Tz::UTC)
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn relative(strategy: Strategy, direction: Direction, unit: Unit, count: u32) -> Clause {
        Clause {
            spec: ParsedSpec::Relative {
                direction,
                unit,
                count,
            },
            strategy,
        }
    }

    fn literal(fields: DateFields) -> Clause {
        Clause {
            spec: ParsedSpec::Literal(fields),
            strategy: Strategy::LiteralDate,
        }
    }

    fn span(clause: Clause) -> Result<Range> {
        let clock = clock();
        Resolver::new(&clock, WeekWindow::Rolling).span(&clause)
    }

    // ── weekday_offset ──────────────────────────────────────────────────

    #[test]
    fn test_weekday_offset_formula() {
        // Anchor weekday is Friday
        let fri = Weekday::Fri;
        assert_eq!(weekday_offset(Weekday::Tue, fri, Direction::None), 4);
        assert_eq!(weekday_offset(Weekday::Tue, fri, Direction::This), 4);
        assert_eq!(weekday_offset(Weekday::Tue, fri, Direction::Next), 4);
        assert_eq!(weekday_offset(Weekday::Tue, fri, Direction::Last), -3);
    }

    #[test]
    fn test_weekday_offset_same_day() {
        let fri = Weekday::Fri;
        assert_eq!(weekday_offset(fri, fri, Direction::None), 0);
        assert_eq!(weekday_offset(fri, fri, Direction::This), 0);
        assert_eq!(weekday_offset(fri, fri, Direction::Next), 7);
        assert_eq!(weekday_offset(fri, fri, Direction::Last), -7);
    }

    // ── counted spans ───────────────────────────────────────────────────

    #[test]
    fn test_next_two_months() {
        let range = span(relative(Strategy::CountedSpan, Direction::Next, Unit::Month, 2)).unwrap();
        assert_eq!(range.start(), utc(2017, 6, 16, 19, 37, 22));
        assert_eq!(range.end(), utc(2017, 8, 16, 19, 37, 22));
    }

    #[test]
    fn test_last_24_months() {
        let clause = relative(Strategy::CountedSpan, Direction::Last, Unit::Month, 24);
        let range = span(clause).unwrap();
        assert_eq!(range.start(), utc(2015, 6, 16, 19, 37, 22));
        assert_eq!(range.end(), utc(2017, 6, 16, 19, 37, 22));
    }

    #[test]
    fn test_last_five_hours_is_fixed_duration() {
        let range = span(relative(Strategy::CountedSpan, Direction::Last, Unit::Hour, 5)).unwrap();
        assert_eq!(range.start(), utc(2017, 6, 16, 14, 37, 22));
        assert_eq!(range.duration(), Duration::hours(5));
    }

    #[test]
    fn test_last_two_days_includes_partial_day() {
        // Exactly 48 hours ending now, not two whole calendar days
        let range = span(relative(Strategy::CountedSpan, Direction::Last, Unit::Day, 2)).unwrap();
        assert_eq!(range.start(), utc(2017, 6, 14, 19, 37, 22));
        assert_eq!(range.end(), clock().now());
    }

    #[test]
    fn test_counted_span_overflow_is_semantic() {
        let err = span(relative(Strategy::CountedSpan, Direction::Next, Unit::Year, u32::MAX))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        let err = span(relative(Strategy::CountedSpan, Direction::Next, Unit::Week, u32::MAX))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    // ── snapped units ───────────────────────────────────────────────────

    #[test]
    fn test_this_month_snaps() {
        let range = span(relative(Strategy::SnappedUnit, Direction::This, Unit::Month, 1)).unwrap();
        assert_eq!(range.start(), utc(2017, 6, 1, 0, 0, 0));
        assert_eq!(range.end(), utc(2017, 7, 1, 0, 0, 0));
    }

    #[test]
    fn test_last_year_snaps() {
        let range = span(relative(Strategy::SnappedUnit, Direction::Last, Unit::Year, 1)).unwrap();
        assert_eq!(range.start(), utc(2016, 1, 1, 0, 0, 0));
        assert_eq!(range.end(), utc(2017, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_next_month_across_year_end() {
        let now = Utc.with_ymd_and_hms(2017, 12, 20, 8, 0, 0).unwrap();
        let clock = ReferenceClock::new(now, Tz::UTC);
        let clause = relative(Strategy::SnappedUnit, Direction::Next, Unit::Month, 1);
        let range = Resolver::new(&clock, WeekWindow::Rolling).span(&clause).unwrap();
        assert_eq!(range.start(), utc(2018, 1, 1, 0, 0, 0));
        assert_eq!(range.end(), utc(2018, 2, 1, 0, 0, 0));
    }

    #[test]
    fn test_rolling_weeks() {
        let now = clock().now();
        let this = span(relative(Strategy::SnappedUnit, Direction::This, Unit::Week, 1)).unwrap();
        assert_eq!(this.start(), now);
        assert_eq!(this.end(), utc(2017, 6, 23, 19, 37, 22));

        let next = span(relative(Strategy::SnappedUnit, Direction::Next, Unit::Week, 1)).unwrap();
        assert_eq!(next.start(), this.end());

        let last = span(relative(Strategy::SnappedUnit, Direction::Last, Unit::Week, 1)).unwrap();
        assert_eq!(last.start(), utc(2017, 6, 9, 19, 37, 22));
        assert_eq!(last.end(), now);
    }

    #[test]
    fn test_calendar_weeks() {
        let clock = clock();
        let clause = relative(Strategy::SnappedUnit, Direction::This, Unit::Week, 1);

        // Friday June 16 2017 → ISO week starts Monday June 12
        let monday = Resolver::new(&clock, WeekWindow::Calendar(WeekStartDay::Monday));
        let range = monday.span(&clause).unwrap();
        assert_eq!(range.start(), utc(2017, 6, 12, 0, 0, 0));
        assert_eq!(range.end(), utc(2017, 6, 19, 0, 0, 0));

        // ... and the Sunday-start week on Sunday June 11
        let sunday = Resolver::new(&clock, WeekWindow::Calendar(WeekStartDay::Sunday));
        let last = relative(Strategy::SnappedUnit, Direction::Last, Unit::Week, 1);
        let range = sunday.span(&last).unwrap();
        assert_eq!(range.start(), utc(2017, 6, 4, 0, 0, 0));
        assert_eq!(range.end(), utc(2017, 6, 11, 0, 0, 0));
    }

    // ── named days and weekdays ─────────────────────────────────────────

    #[test]
    fn test_named_days_anchor_at_now() {
        let now = clock().now();
        let tomorrow = span(relative(Strategy::NamedDay, Direction::Next, Unit::Day, 1)).unwrap();
        assert_eq!(tomorrow.start(), now + Duration::days(1));
        assert_eq!(tomorrow.end(), now + Duration::days(2));

        let yesterday = span(relative(Strategy::NamedDay, Direction::Last, Unit::Day, 1)).unwrap();
        assert_eq!(yesterday.end(), now);

        let before = span(relative(Strategy::NamedDay, Direction::Last, Unit::Day, 2)).unwrap();
        assert_eq!(before.start(), now - Duration::days(2));
        assert_eq!(before.end(), now - Duration::days(1));
    }

    #[test]
    fn test_weekday_span() {
        // Friday June 16 → last Tuesday is June 13
        let range = span(relative(
            Strategy::Weekday,
            Direction::Last,
            Unit::Weekday(Weekday::Tue),
            1,
        ))
        .unwrap();
        assert_eq!(range.start(), utc(2017, 6, 13, 19, 37, 22));
        assert_eq!(range.duration(), Duration::days(1));
    }

    // ── literals ────────────────────────────────────────────────────────

    #[test]
    fn test_literal_month_defaults_to_current_year() {
        let range = span(literal(DateFields {
            month: Some(12),
            ..DateFields::default()
        }))
        .unwrap();
        assert_eq!(range.start(), utc(2017, 12, 1, 0, 0, 0));
        assert_eq!(range.end(), utc(2018, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_literal_year_only() {
        let range = span(literal(DateFields {
            year: Some(2015),
            ..DateFields::default()
        }))
        .unwrap();
        assert_eq!(range.start(), utc(2015, 1, 1, 0, 0, 0));
        assert_eq!(range.end(), utc(2016, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_literal_single_day() {
        let range = span(literal(DateFields {
            year: Some(2016),
            month: Some(2),
            day: Some(29),
            ..DateFields::default()
        }))
        .unwrap();
        assert_eq!(range.start(), utc(2016, 2, 29, 0, 0, 0));
        assert_eq!(range.end(), utc(2016, 3, 1, 0, 0, 0));
    }

    #[test]
    fn test_literal_april_31_is_semantic() {
        let err = span(literal(DateFields {
            month: Some(4),
            day: Some(31),
            ..DateFields::default()
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert!(err.to_string().contains("2017-04-31"), "got: {err}");
    }

    #[test]
    fn test_literal_with_time_is_one_unit_wide() {
        let hour = span(literal(DateFields {
            year: Some(2016),
            month: Some(1),
            day: Some(10),
            hour: Some(5),
            ..DateFields::default()
        }))
        .unwrap();
        assert_eq!(hour.start(), utc(2016, 1, 10, 5, 0, 0));
        assert_eq!(hour.duration(), Duration::hours(1));

        let minute = span(literal(DateFields {
            hour: Some(9),
            minute: Some(30),
            ..DateFields::default()
        }))
        .unwrap();
        assert_eq!(minute.start(), utc(2017, 6, 16, 9, 30, 0));
        assert_eq!(minute.duration(), Duration::minutes(1));
    }

    #[test]
    fn test_literal_time_without_day_is_semantic() {
        let err = span(literal(DateFields {
            month: Some(1),
            hour: Some(5),
            ..DateFields::default()
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    // ── anchors ─────────────────────────────────────────────────────────

    #[test]
    fn test_anchor_literal_side() {
        let clock = clock();
        let resolver = Resolver::new(&clock, WeekWindow::Rolling);
        let side = literal(DateFields {
            year: Some(2016),
            month: Some(1),
            day: Some(10),
            hour: Some(5),
            ..DateFields::default()
        });
        assert_eq!(resolver.anchor(&side).unwrap(), utc(2016, 1, 10, 5, 0, 0));

        let month_only = literal(DateFields {
            month: Some(3),
            ..DateFields::default()
        });
        assert_eq!(resolver.anchor(&month_only).unwrap(), utc(2017, 3, 1, 0, 0, 0));
    }

    #[test]
    fn test_anchor_clock_only_side_is_semantic() {
        let clock = clock();
        let resolver = Resolver::new(&clock, WeekWindow::Rolling);
        let side = literal(DateFields {
            hour: Some(9),
            ..DateFields::default()
        });
        let err = resolver.anchor(&side).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_anchor_relative_side_is_range_start() {
        let clock = clock();
        let resolver = Resolver::new(&clock, WeekWindow::Rolling);
        let side = relative(Strategy::SnappedUnit, Direction::Next, Unit::Month, 1);
        assert_eq!(resolver.anchor(&side).unwrap(), utc(2017, 7, 1, 0, 0, 0));
    }

    #[test]
    fn test_time_today() {
        let clock = clock();
        let resolver = Resolver::new(&clock, WeekWindow::Rolling);
        let two_pm = DateFields {
            hour: Some(14),
            ..DateFields::default()
        };
        assert_eq!(resolver.time_today(&two_pm).unwrap(), utc(2017, 6, 16, 14, 0, 0));
    }

    #[test]
    fn test_strategy_mismatch_is_semantic() {
        let clause = Clause {
            spec: ParsedSpec::Literal(DateFields::default()),
            strategy: Strategy::CountedSpan,
        };
        assert_eq!(span(clause).unwrap_err().kind(), ErrorKind::Semantic);
    }
}
