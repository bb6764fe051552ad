//! The reference "now" every relative expression is resolved against.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::calendar::{localize, localize_forward};
use crate::error::Result;

/// An instant plus the timezone used to read calendar fields from it.
///
/// Snapshotted once per parse so every stage sees the same "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceClock {
    now: DateTime<Tz>,
}

impl ReferenceClock {
    pub fn new(now: DateTime<Utc>, timezone: Tz) -> Self {
        Self {
            now: now.with_timezone(&timezone),
        }
    }

    /// Read the system clock (`Utc::now()`).
    pub fn system(timezone: Tz) -> Self {
        Self::new(Utc::now(), timezone)
    }

    pub fn now(&self) -> DateTime<Tz> {
        self.now
    }

    pub fn timezone(&self) -> Tz {
        self.now.timezone()
    }

    /// Today's calendar date in the reference timezone.
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// `date` at `time`, interpreted in the reference timezone.
    pub fn at(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>> {
        localize(&self.timezone(), date.and_time(time))
    }

    /// First instant of `date` in the reference timezone: local midnight, or
    /// the end of a DST gap that swallows midnight.
    pub fn midnight(&self, date: NaiveDate) -> Result<DateTime<Tz>> {
        localize_forward(&self.timezone(), date.and_time(NaiveTime::MIN))
    }
}
