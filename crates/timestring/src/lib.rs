//! # timestring
//!
//! Deterministic natural-language time ranges.
//!
//! Turns English expressions such as "next 2 months", "last Tuesday",
//! "December" or "from jan 10 2016 5am to 9am" into a timezone-aware
//! half-open interval `[start, end)`. Resolution is a pure function of the
//! text and a reference clock, so results are reproducible in tests.
//!
//! ## Modules
//!
//! - [`lexicon`]: month, weekday, unit and keyword vocabulary
//! - [`tokenizer`]: raw text → typed tokens
//! - [`grammar`]: ordered rule table over the token stream
//! - [`resolver`]: parsed clauses → instants and ranges against a clock
//! - [`calendar`]: month/year arithmetic with day clamping, DST-aware localization
//! - [`range`]: the [`Range`] type and the builder that composes it
//! - [`clock`]: the reference "now"
//! - [`config`]: parse options and the default timezone
//! - [`error`]: Error types
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use timestring::{parse_range, ParseOptions};
//!
//! let options = ParseOptions::new()
//!     .with_timezone("UTC")
//!     .with_now(Utc.with_ymd_and_hms(2017, 6, 16, 19, 37, 22).unwrap());
//!
//! let range = parse_range("December", &options).unwrap();
//! assert_eq!(range.start().to_rfc3339(), "2017-12-01T00:00:00+00:00");
//! assert_eq!(range.end().to_rfc3339(), "2018-01-01T00:00:00+00:00");
//! ```

pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod grammar;
pub mod lexicon;
pub mod range;
pub mod resolver;
pub mod tokenizer;

use std::str::FromStr;

use tracing::{debug, info};

pub use clock::ReferenceClock;
pub use config::{
    default_timezone, parse_timezone, set_default_timezone, ParseOptions, WeekStartDay,
    WeekWindow,
};
pub use error::{ErrorKind, ParseError, Result};
pub use range::{Range, RangeSummary};

/// Parse `text` into a [`Range`] using `options`.
///
/// # Errors
///
/// Returns a [`ParseError`] whose [`kind`](ParseError::kind) tells which stage
/// rejected the input; every error except a timezone error carries `text`.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use timestring::{parse_range, ParseOptions};
///
/// let now = Utc.with_ymd_and_hms(2017, 6, 16, 19, 37, 22).unwrap();
/// let options = ParseOptions::new().with_timezone("UTC").with_now(now);
///
/// let range = parse_range("tomorrow", &options).unwrap();
/// assert_eq!(range.start(), now + Duration::days(1));
/// assert_eq!(range.duration(), Duration::days(1));
/// ```
pub fn parse_range(text: &str, options: &ParseOptions) -> Result<Range> {
    let clock = options.reference_clock()?;
    let result = parse_range_with_clock(text, &clock, options.week_window);
    if options.verbose {
        match &result {
            Ok(range) => info!(
                input = text,
                timezone = clock.timezone().name(),
                now = %clock.now().to_rfc3339(),
                range = %range,
                "parsed time expression"
            ),
            Err(e) => info!(input = text, kind = ?e.kind(), error = %e, "time expression rejected"),
        }
    }
    result
}

/// Parse `text` against an explicit reference clock.
///
/// # Errors
///
/// Same as [`parse_range`], minus timezone validation: the clock already
/// carries a valid zone.
pub fn parse_range_with_clock(
    text: &str,
    clock: &ReferenceClock,
    week_window: WeekWindow,
) -> Result<Range> {
    let attach = |e: ParseError| e.with_input(text);
    let tokens = tokenizer::tokenize(text).map_err(attach)?;
    let composition = grammar::match_tokens(&tokens).map_err(attach)?;
    let resolver = resolver::Resolver::new(clock, week_window);
    let range = range::build(&composition, &resolver).map_err(attach)?;
    debug!(
        strategy = ?composition.strategy(),
        start = %range.start().to_rfc3339(),
        end = %range.end().to_rfc3339(),
        "resolved range"
    );
    Ok(range)
}

impl Range {
    /// Parse with default options: the default timezone and the system clock.
    ///
    /// # Errors
    ///
    /// See [`parse_range`].
    pub fn parse(text: &str) -> Result<Range> {
        parse_range(text, &ParseOptions::default())
    }
}

impl FromStr for Range {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Range::parse(s)
    }
}
