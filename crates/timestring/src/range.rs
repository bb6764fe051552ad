//! The half-open interval every expression resolves to, and the builder that
//! composes resolver output into one.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{ParseError, Result};
use crate::grammar::Composition;
use crate::resolver::Resolver;

/// A half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl Range {
    /// Build a range, rejecting empty and inverted intervals.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Semantic`] unless `start < end`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        if start >= end {
            return Err(ParseError::semantic(format!(
                "range start {} is not before its end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }

    /// Whether `instant` falls in `[start, end)`.
    pub fn contains<T: TimeZone>(&self, instant: &DateTime<T>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Display-oriented snapshot of the range.
    pub fn summary(&self) -> RangeSummary {
        let total_seconds = self.duration().num_seconds();
        let days = total_seconds / 86400;
        let remainder = total_seconds % 86400;

        RangeSummary {
            start: self.start.to_rfc3339(),
            end: self.end.to_rfc3339(),
            start_utc: self.start.with_timezone(&Utc).to_rfc3339(),
            end_utc: self.end.with_timezone(&Utc).to_rfc3339(),
            timezone: self.timezone().name().to_string(),
            duration_seconds: total_seconds,
            human_readable: format_human_duration(
                days,
                remainder / 3600,
                (remainder % 3600) / 60,
                remainder % 60,
            ),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// A range rendered as strings, for logs and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeSummary {
    /// Inclusive start (RFC 3339 with the local offset).
    pub start: String,
    /// Exclusive end (RFC 3339 with the local offset).
    pub end: String,
    pub start_utc: String,
    pub end_utc: String,
    /// The IANA timezone the range was resolved in.
    pub timezone: String,
    pub duration_seconds: i64,
    /// e.g. "2 days, 3 hours, 15 minutes".
    pub human_readable: String,
}

// ── Builder ─────────────────────────────────────────────────────────────────

/// Combine resolver output per the matched composition.
///
/// Two-sided ranges resolve each side to a standalone instant: a side never
/// borrows date fields from the other one.
pub fn build(composition: &Composition, resolver: &Resolver<'_>) -> Result<Range> {
    match composition {
        Composition::Single(clause) => resolver.span(clause),
        Composition::TwoSided { from, to } => {
            Range::new(resolver.anchor(from)?, resolver.anchor(to)?)
        }
        Composition::TimeOfDay { from, to } => {
            Range::new(resolver.time_today(from)?, resolver.time_today(to)?)
        }
    }
}

/// Format a human-readable duration string.
fn format_human_duration(days: i64, hours: i64, minutes: i64, seconds: i64) -> String {
    let plural = |n: i64, unit: &str| format!("{} {}{}", n, unit, if n == 1 { "" } else { "s" });
    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(plural(seconds, "second"));
    }
    parts.join(", ")
}
