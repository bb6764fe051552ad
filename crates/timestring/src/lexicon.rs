//! Static English vocabulary: month, weekday and unit names, keywords, and
//! ordinal suffixes. Every lookup expects lower-case input.

use chrono::Weekday;

/// Words with a fixed grammatical role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Next,
    Last,
    This,
    Current,
    Previous,
    Upcoming,
    From,
    To,
    Between,
    And,
    Ago,
    Today,
    Tomorrow,
    Yesterday,
    After,
    Before,
    The,
    At,
}

/// A span of time a count or modifier can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
    /// A named day of the week. Never produced by the tokenizer as a unit
    /// word; the grammar builds it from a weekday name.
    Weekday(Weekday),
}

impl Unit {
    /// Fixed length in seconds, for units that have one.
    pub fn fixed_seconds(self) -> Option<i64> {
        match self {
            Unit::Second => Some(1),
            Unit::Minute => Some(60),
            Unit::Hour => Some(3_600),
            Unit::Day | Unit::Weekday(_) => Some(86_400),
            Unit::Week => Some(604_800),
            Unit::Month | Unit::Year => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Meridiem {
    Am,
    Pm,
}

pub fn parse_keyword(s: &str) -> Option<Keyword> {
    match s {
        "next" => Some(Keyword::Next),
        "last" => Some(Keyword::Last),
        "this" => Some(Keyword::This),
        "current" => Some(Keyword::Current),
        "previous" => Some(Keyword::Previous),
        "upcoming" => Some(Keyword::Upcoming),
        "from" => Some(Keyword::From),
        "to" => Some(Keyword::To),
        "between" => Some(Keyword::Between),
        "and" => Some(Keyword::And),
        "ago" => Some(Keyword::Ago),
        "today" => Some(Keyword::Today),
        "tomorrow" => Some(Keyword::Tomorrow),
        "yesterday" => Some(Keyword::Yesterday),
        "after" => Some(Keyword::After),
        "before" => Some(Keyword::Before),
        "the" => Some(Keyword::The),
        "at" => Some(Keyword::At),
        _ => None,
    }
}

/// Parse a weekday name (full and abbreviated).
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Parse a month name to number (1-12).
pub fn parse_month(s: &str) -> Option<u32> {
    match s {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" | "sept" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

/// Parse a calendar unit name, singular or plural.
pub fn parse_unit(s: &str) -> Option<Unit> {
    match s {
        "second" | "seconds" | "sec" | "secs" => Some(Unit::Second),
        "minute" | "minutes" | "min" | "mins" => Some(Unit::Minute),
        "hour" | "hours" | "hr" | "hrs" => Some(Unit::Hour),
        "day" | "days" => Some(Unit::Day),
        "week" | "weeks" | "wk" | "wks" => Some(Unit::Week),
        "month" | "months" | "mo" | "mos" => Some(Unit::Month),
        "year" | "years" | "yr" | "yrs" => Some(Unit::Year),
        _ => None,
    }
}

pub fn parse_meridiem(s: &str) -> Option<Meridiem> {
    match s {
        "am" | "a.m." => Some(Meridiem::Am),
        "pm" | "p.m." => Some(Meridiem::Pm),
        _ => None,
    }
}

/// Strip an ordinal suffix from a digit run: "10th" → "10", "1st" → "1".
/// Returns `None` unless what remains is all digits.
pub fn strip_ordinal_suffix(s: &str) -> Option<&str> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .unwrap_or(s);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}
