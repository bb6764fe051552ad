//! Calendar arithmetic that is not fixed-duration.
//!
//! Months and years are added on the wall-clock date in the reference
//! timezone: the month index moves, the year carries, the day-of-month is
//! kept and clamped to the last day of a shorter month (Jan 31 + 1 month =
//! Feb 28 or 29).

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{ParseError, Result};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`. `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 if is_leap_year(year) => Some(29),
        2 => Some(28),
        _ => None,
    }
}

/// Add a signed number of calendar months to a date, clamping the day.
///
/// Returns `None` only when the result leaves chrono's representable range.
pub fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let index = i64::from(date.year())
        .checked_mul(12)?
        .checked_add(i64::from(date.month0()))?
        .checked_add(months)?;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Add a signed number of calendar years: twelve months per year, so Feb 29
/// lands on Feb 28 in a common year.
pub fn add_years(date: NaiveDate, years: i64) -> Option<NaiveDate> {
    add_months(date, years.checked_mul(12)?)
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the year containing `date`.
pub fn first_of_year(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

/// Interpret a wall-clock datetime in `tz`.
///
/// A time repeated by a DST fold takes the earlier instant; a time skipped
/// by a DST gap is an error.
pub fn localize(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        ParseError::semantic(format!("{naive} does not exist in {}", tz.name()))
    })
}

/// Longest DST gap scanned for by [`localize_forward`]. Samoa skipped all of
/// December 30, 2011.
const MAX_GAP_MINUTES: i64 = 48 * 60;

/// First instant at or after the wall-clock datetime `naive` in `tz`.
///
/// Same as [`localize`] except inside a DST gap, where the result is the
/// instant the gap ends: in America/Asuncion, October 1, 2017 starts at
/// 01:00 because 00:00-00:59 was skipped. Used for calendar boundaries and
/// derived wall-clock times, never for a time the caller wrote.
pub fn localize_forward(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Ok(dt);
    }
    let valid = |local: NaiveDateTime| tz.from_local_datetime(&local).earliest();

    // Minute steps find where the gap ends; second steps back pin it down
    // for zones whose offsets carry seconds.
    for minutes in 1..=MAX_GAP_MINUTES {
        let Some(local) = naive.checked_add_signed(Duration::minutes(minutes)) else {
            break;
        };
        let Some(mut first) = valid(local) else {
            continue;
        };
        for seconds in 1..60 {
            let Some(earlier) = local
                .checked_sub_signed(Duration::seconds(seconds))
                .and_then(valid)
            else {
                break;
            };
            first = earlier;
        }
        return Ok(first);
    }
    Err(ParseError::semantic(format!(
        "{naive} does not exist in {}",
        tz.name()
    )))
}

/// Shift an instant by calendar months, keeping its wall-clock time. A
/// shifted time that lands in a DST gap moves to the end of the gap.
pub fn shift_months(dt: &DateTime<Tz>, months: i64) -> Result<DateTime<Tz>> {
    let naive = dt.naive_local();
    let date = add_months(naive.date(), months)
        .ok_or_else(|| ParseError::semantic("month offset out of range"))?;
    localize_forward(&dt.timezone(), date.and_time(naive.time()))
}
