//! Parse options and the process-wide default timezone.

use std::sync::OnceLock;

use chrono::{DateTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::clock::ReferenceClock;
use crate::error::{ParseError, Result};

// ── Week conventions ────────────────────────────────────────────────────────

/// Which day begins a calendar week.
///
/// Does **not** affect named-weekday expressions like "next Monday".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = day 0 of the week).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = day 0 of the week).
    Sunday,
}

/// How "this week", "next week" and "last week" are windowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WeekWindow {
    /// Seven days anchored at now: "this week" = `[now, now + 7d)`.
    #[default]
    Rolling,
    /// Seven days starting at midnight of the current week's first day.
    Calendar(WeekStartDay),
}

/// How many days `weekday` is from the week-start day.
pub(crate) fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> i64 {
    match week_start {
        WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
        WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
    }
}

// ── Default timezone ────────────────────────────────────────────────────────

static DEFAULT_TIMEZONE: OnceLock<Tz> = OnceLock::new();
static HOST_TIMEZONE: OnceLock<Tz> = OnceLock::new();

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| ParseError::InvalidTimezone(s.to_string()))
}

/// Install the process-wide default timezone. Write-once: returns
/// `Ok(false)` and leaves the existing default alone if one was already set.
///
/// # Errors
///
/// Returns [`ParseError::InvalidTimezone`] if `name` is not an IANA zone.
pub fn set_default_timezone(name: &str) -> Result<bool> {
    let tz = parse_timezone(name)?;
    Ok(DEFAULT_TIMEZONE.set(tz).is_ok())
}

/// The timezone used when [`ParseOptions::timezone`] is unset: the installed
/// default, else the `TZ` environment variable, else the system local zone,
/// else UTC.
pub fn default_timezone() -> Tz {
    if let Some(tz) = DEFAULT_TIMEZONE.get() {
        return *tz;
    }
    *HOST_TIMEZONE.get_or_init(|| {
        let env = std::env::var("TZ").ok();
        let system = iana_time_zone::get_timezone()
            .map_err(|e| debug!(error = %e, "system timezone unavailable"))
            .ok();
        host_timezone(env.as_deref(), system.as_deref())
    })
}

/// First of `env` (a `TZ` value, optionally `:`-prefixed) and `system` (the
/// host's IANA zone name) that names a known zone, else UTC.
fn host_timezone(env: Option<&str>, system: Option<&str>) -> Tz {
    let env = env.map(|name| name.trim_start_matches(':'));
    [env, system]
        .into_iter()
        .flatten()
        .find_map(|name| parse_timezone(name).ok())
        .unwrap_or(Tz::UTC)
}

// ── ParseOptions ────────────────────────────────────────────────────────────

/// Options for [`crate::parse_range`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// IANA timezone name. `None` uses [`default_timezone`].
    pub timezone: Option<String>,
    /// Override for "now". `None` reads the system clock.
    pub now: Option<DateTime<Utc>>,
    /// Convention for "this/next/last week".
    pub week_window: WeekWindow,
    /// Emit an `info` event per parse. Never changes the result.
    pub verbose: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_week_window(mut self, week_window: WeekWindow) -> Self {
        self.week_window = week_window;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validate the timezone and snapshot the clock.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidTimezone`] for an unknown zone name.
    pub fn reference_clock(&self) -> Result<ReferenceClock> {
        let tz = match &self.timezone {
            Some(name) => parse_timezone(name)?,
            None => default_timezone(),
        };
        Ok(match self.now {
            Some(now) => ReferenceClock::new(now, tz),
            None => ReferenceClock::system(tz),
        })
    }
}
