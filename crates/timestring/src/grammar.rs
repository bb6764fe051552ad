//! Ordered grammar rules over the token stream.
//!
//! Each rule is a pure function that either declines (`None`, the shape does
//! not apply), accepts (`Some(Ok(..))`), or recognizes the shape but rejects
//! it (`Some(Err(..))`, terminal). Rules are tried in the order of [`RULES`]
//! and the first one that does not decline decides the outcome. Several
//! shapes overlap, so the order matters: "from X to Y" must be seen before
//! any single-anchor rule gets a chance to read X alone.

use chrono::Timelike;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::lexicon::{Keyword, Unit};
use crate::tokenizer::{Token, TokenKind};

// ── Parsed forms ────────────────────────────────────────────────────────────

/// Modifier of a relative expression after synonym folding: `current` is
/// `this`, `previous` is `last`, `upcoming` is `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    None,
    This,
    Next,
    Last,
}

/// Literal calendar fields as written. Omitted fields stay `None`; the
/// resolver decides the granularity from the most specific one present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateFields {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// 24-hour clock.
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
}

impl DateFields {
    pub fn has_date(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some()
    }

    pub fn has_time(&self) -> bool {
        self.hour.is_some()
    }

    pub fn is_clock_only(&self) -> bool {
        self.has_time() && !self.has_date()
    }
}

/// The meaning of one side of an expression: either relative to now, or a
/// literal date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedSpec {
    Relative {
        direction: Direction,
        unit: Unit,
        count: u32,
    },
    Literal(DateFields),
}

/// How a matched expression becomes a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    CountedSpan,
    Weekday,
    NamedDay,
    SnappedUnit,
    LiteralDate,
    TwoSided,
    TimeOfDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause {
    pub spec: ParsedSpec,
    pub strategy: Strategy,
}

/// The result of matching a full token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    Single(Clause),
    TwoSided { from: Clause, to: Clause },
    TimeOfDay { from: DateFields, to: DateFields },
}

impl Composition {
    pub fn strategy(&self) -> Strategy {
        match self {
            Composition::Single(clause) => clause.strategy,
            Composition::TwoSided { .. } => Strategy::TwoSided,
            Composition::TimeOfDay { .. } => Strategy::TimeOfDay,
        }
    }
}

// ── Rule table ──────────────────────────────────────────────────────────────

type Rule = fn(&[Token]) -> Option<Result<Composition>>;

/// Rules in priority order.
static RULES: &[(&str, Rule)] = &[
    ("two_sided", two_sided as Rule),
    ("time_of_day", time_of_day as Rule),
    ("counted_span", counted_span as Rule),
    ("weekday", weekday as Rule),
    ("named_day", named_day as Rule),
    ("snapped_unit", snapped_unit as Rule),
    ("literal_date", literal_date as Rule),
];

/// Match a full token sequence against the rule table.
///
/// # Errors
///
/// [`ParseError::Grammar`] when every rule declines, otherwise whatever
/// error the first applicable rule raised.
pub fn match_tokens(tokens: &[Token]) -> Result<Composition> {
    for (name, rule) in RULES {
        if let Some(result) = rule(tokens) {
            debug!(rule = *name, accepted = result.is_ok(), "grammar rule applied");
            return result;
        }
    }
    debug!(tokens = tokens.len(), "no grammar rule applied");
    Err(ParseError::grammar())
}

// ── Rules ───────────────────────────────────────────────────────────────────

/// `from <side> to <side>` / `between <side> and <side>`, where at least one
/// side carries a date.
fn two_sided(tokens: &[Token]) -> Option<Result<Composition>> {
    let (left, right) = split_range(tokens)?;
    let (from, to) = match (side(left)?, side(right)?) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => return Some(Err(e)),
    };
    if !has_date_context(&from.spec) && !has_date_context(&to.spec) {
        return None;
    }
    Some(Ok(Composition::TwoSided { from, to }))
}

/// `from <clock> to <clock>`.
fn time_of_day(tokens: &[Token]) -> Option<Result<Composition>> {
    let (left, right) = split_range(tokens)?;
    let (from, to) = match (literal_fields(left)?, literal_fields(right)?) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => return Some(Err(e)),
    };
    if !from.is_clock_only() || !to.is_clock_only() {
        return None;
    }
    Some(Ok(Composition::TimeOfDay { from, to }))
}

/// `(next|last) <n> <unit>` and `<n> <unit> ago`.
fn counted_span(tokens: &[Token]) -> Option<Result<Composition>> {
    let (direction, number, unit) = match tokens {
        [first, number, rest @ ..] if rest.len() <= 1 && span_direction(first).is_some() => {
            (span_direction(first)?, number, rest.first())
        }
        [number, rest @ .., ago] if rest.len() <= 1 && is_keyword(ago, Keyword::Ago) => {
            (Direction::Last, number, rest.first())
        }
        _ => return None,
    };
    let TokenKind::Number(count) = number.kind() else {
        return None;
    };
    let Some(unit) = unit else {
        return Some(Err(ParseError::ambiguous_unit(number.position())));
    };
    let TokenKind::Unit(unit) = unit.kind() else {
        return None;
    };
    if count == 0 {
        return Some(Err(ParseError::semantic("a count must be at least 1")));
    }
    Some(Ok(Composition::Single(Clause {
        spec: ParsedSpec::Relative {
            direction,
            unit,
            count,
        },
        strategy: Strategy::CountedSpan,
    })))
}

fn weekday(tokens: &[Token]) -> Option<Result<Composition>> {
    weekday_clause(tokens).map(|clause| Ok(Composition::Single(clause)))
}

fn named_day(tokens: &[Token]) -> Option<Result<Composition>> {
    named_day_clause(tokens).map(|clause| Ok(Composition::Single(clause)))
}

fn snapped_unit(tokens: &[Token]) -> Option<Result<Composition>> {
    snapped_unit_clause(tokens).map(|clause| Ok(Composition::Single(clause)))
}

fn literal_date(tokens: &[Token]) -> Option<Result<Composition>> {
    literal_clause(tokens).map(|result| result.map(Composition::Single))
}

// ── Clauses ─────────────────────────────────────────────────────────────────

/// One side of a two-sided range. Counted spans are not sides.
fn side(tokens: &[Token]) -> Option<Result<Clause>> {
    weekday_clause(tokens)
        .or_else(|| named_day_clause(tokens))
        .or_else(|| snapped_unit_clause(tokens))
        .map(Ok)
        .or_else(|| literal_clause(tokens))
}

/// `[this|next|last|current|previous|upcoming]? <weekday>`.
fn weekday_clause(tokens: &[Token]) -> Option<Clause> {
    let (direction, day) = match tokens {
        [day] => (Direction::None, day),
        [modifier, day] => (modifier_direction(modifier)?, day),
        _ => return None,
    };
    let TokenKind::WeekdayName(weekday) = day.kind() else {
        return None;
    };
    Some(Clause {
        spec: ParsedSpec::Relative {
            direction,
            unit: Unit::Weekday(weekday),
            count: 1,
        },
        strategy: Strategy::Weekday,
    })
}

/// `today`, `tomorrow`, `yesterday`, `[the] day after tomorrow`,
/// `[the] day before yesterday`, encoded as relative day counts.
fn named_day_clause(tokens: &[Token]) -> Option<Clause> {
    let tokens = match tokens {
        [the, rest @ ..] if is_keyword(the, Keyword::The) => rest,
        _ => tokens,
    };
    let kinds: Vec<TokenKind> = tokens.iter().map(Token::kind).collect();
    let (direction, count) = match kinds.as_slice() {
        [TokenKind::Keyword(Keyword::Today)] => (Direction::This, 1),
        [TokenKind::Keyword(Keyword::Tomorrow)] => (Direction::Next, 1),
        [TokenKind::Keyword(Keyword::Yesterday)] => (Direction::Last, 1),
        [
            TokenKind::Unit(Unit::Day),
            TokenKind::Keyword(Keyword::After),
            TokenKind::Keyword(Keyword::Tomorrow),
        ] => (Direction::Next, 2),
        [
            TokenKind::Unit(Unit::Day),
            TokenKind::Keyword(Keyword::Before),
            TokenKind::Keyword(Keyword::Yesterday),
        ] => (Direction::Last, 2),
        _ => return None,
    };
    Some(Clause {
        spec: ParsedSpec::Relative {
            direction,
            unit: Unit::Day,
            count,
        },
        strategy: Strategy::NamedDay,
    })
}

/// `(this|next|last|current|previous|upcoming) (week|month|year)`.
fn snapped_unit_clause(tokens: &[Token]) -> Option<Clause> {
    let [modifier, unit] = tokens else {
        return None;
    };
    let direction = modifier_direction(modifier)?;
    let TokenKind::Unit(unit @ (Unit::Week | Unit::Month | Unit::Year)) = unit.kind() else {
        return None;
    };
    Some(Clause {
        spec: ParsedSpec::Relative {
            direction,
            unit,
            count: 1,
        },
        strategy: Strategy::SnappedUnit,
    })
}

fn literal_clause(tokens: &[Token]) -> Option<Result<Clause>> {
    literal_fields(tokens).map(|result| {
        result.map(|fields| Clause {
            spec: ParsedSpec::Literal(fields),
            strategy: Strategy::LiteralDate,
        })
    })
}

/// Month name, day, year and clock time in any order. Commas and `at` are
/// ignored. A number of three or more digits is a year, one of up to 31 a
/// day; two-digit years ("jan 10 99") are not accepted. Declines on a
/// repeated field, a day without a month, or any other token.
fn literal_fields(tokens: &[Token]) -> Option<Result<DateFields>> {
    let mut fields = DateFields::default();
    let mut clock = None;

    for token in tokens {
        match token.kind() {
            TokenKind::Separator | TokenKind::Keyword(Keyword::At) => {}
            TokenKind::MonthName(month) => set_once(&mut fields.month, month)?,
            TokenKind::Number(n) if token.digit_count() >= 3 => {
                set_once(&mut fields.year, i32::try_from(n).ok()?)?
            }
            TokenKind::Number(n) if n <= 31 => set_once(&mut fields.day, n)?,
            TokenKind::Number(_) => return None,
            TokenKind::ClockTime(time) => set_once(&mut clock, (time, token.text()))?,
            _ => return None,
        }
    }

    if fields.day.is_some() && fields.month.is_none() {
        return None;
    }
    if let Some((time, text)) = clock {
        let Some(naive) = time.to_naive_time() else {
            return Some(Err(ParseError::semantic(format!(
                "'{text}' is not a valid time of day"
            ))));
        };
        fields.hour = Some(naive.hour());
        fields.minute = time.minute.map(|_| naive.minute());
        fields.second = time.second.map(|_| naive.second());
    }
    if !fields.has_date() && !fields.has_time() {
        return None;
    }
    Some(Ok(fields))
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Split `from X to Y` or `between X and Y` into its two non-empty sides.
fn split_range(tokens: &[Token]) -> Option<(&[Token], &[Token])> {
    let (first, rest) = tokens.split_first()?;
    let close = match first.kind() {
        TokenKind::Keyword(Keyword::From) => Keyword::To,
        TokenKind::Keyword(Keyword::Between) => Keyword::And,
        _ => return None,
    };
    let at = rest.iter().position(|t| is_keyword(t, close))?;
    let (left, right) = (&rest[..at], &rest[at + 1..]);
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left, right))
}

fn has_date_context(spec: &ParsedSpec) -> bool {
    match spec {
        ParsedSpec::Relative { .. } => true,
        ParsedSpec::Literal(fields) => fields.has_date(),
    }
}

fn is_keyword(token: &Token, keyword: Keyword) -> bool {
    token.kind() == TokenKind::Keyword(keyword)
}

/// Modifiers that may precede a weekday or calendar unit.
fn modifier_direction(token: &Token) -> Option<Direction> {
    match token.kind() {
        TokenKind::Keyword(Keyword::This | Keyword::Current) => Some(Direction::This),
        TokenKind::Keyword(Keyword::Next | Keyword::Upcoming) => Some(Direction::Next),
        TokenKind::Keyword(Keyword::Last | Keyword::Previous) => Some(Direction::Last),
        _ => None,
    }
}

/// Modifiers that may precede a count: only the forward and backward ones.
fn span_direction(token: &Token) -> Option<Direction> {
    modifier_direction(token).filter(|d| *d != Direction::This)
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> Option<()> {
    if slot.is_some() {
        return None;
    }
    *slot = Some(value);
    Some(())
}
