//! Scan raw text into typed tokens.
//!
//! Words are separated by whitespace and commas. Each word is lower-cased and
//! classified against the tables in [`crate::lexicon`]; a word that fits no
//! category is a [`ParseError::Lex`]. A second pass folds "2 pm" and
//! "9:30 pm" into single clock-time tokens.

use chrono::{NaiveTime, Weekday};
use tracing::trace;

use crate::error::{ParseError, Result};
use crate::lexicon::{self, Keyword, Meridiem, Unit};

/// A wall-clock time as written: "5am", "9:30pm", "14:00".
///
/// Minutes and seconds stay `None` when omitted so the resolver can tell
/// "5pm" (an hour) from "5:00pm" (a minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub meridiem: Option<Meridiem>,
}

impl ClockTime {
    /// Convert to a 24-hour time. `None` for out-of-range values such as
    /// "13pm" or "9:75".
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        let hour24 = match (self.hour, self.meridiem) {
            (h, None) => h,
            (h, Some(_)) if h == 0 || h > 12 => return None,
            (12, Some(Meridiem::Am)) => 0,
            (12, Some(Meridiem::Pm)) => 12,
            (h, Some(Meridiem::Pm)) => h + 12,
            (h, Some(Meridiem::Am)) => h,
        };
        NaiveTime::from_hms_opt(
            hour24,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Number(u32),
    Unit(Unit),
    MonthName(u32),
    WeekdayName(Weekday),
    Meridiem(Meridiem),
    ClockTime(ClockTime),
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: &str, position: usize) -> Self {
        Self {
            kind,
            text: text.to_string(),
            position,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The lower-cased source text of the token.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of the token in the original input.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn numeric_value(&self) -> Option<u32> {
        match self.kind {
            TokenKind::Number(n) | TokenKind::MonthName(n) => Some(n),
            _ => None,
        }
    }

    /// Number of digits the token was written with ("2016" → 4, "10th" → 2).
    pub fn digit_count(&self) -> usize {
        self.text.bytes().filter(u8::is_ascii_digit).count()
    }
}

/// Tokenize a time expression.
///
/// # Errors
///
/// Returns [`ParseError::Lex`] for the first word that is neither vocabulary,
/// a number, nor a clock time. Runs made only of punctuation are skipped.
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() || ch == ',' {
            if let Some(start) = word_start.take() {
                tokens.extend(classify(&text[start..i], start)?);
            }
            if ch == ',' {
                tokens.push(Token::new(TokenKind::Separator, ",", i));
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(start) = word_start {
        tokens.extend(classify(&text[start..], start)?);
    }

    let tokens = merge_meridiems(tokens);
    trace!(
        tokens = ?tokens.iter().map(Token::text).collect::<Vec<_>>(),
        "tokenized"
    );
    Ok(tokens)
}

/// Classify one word. Surrounding punctuation is tolerated ("tomorrow.");
/// a word that is nothing but punctuation yields no token.
fn classify(word: &str, position: usize) -> Result<Option<Token>> {
    let lower = word.to_lowercase();
    if let Some(kind) = classify_word(&lower, position)? {
        return Ok(Some(Token::new(kind, &lower, position)));
    }

    let trimmed = lower.trim_matches(|c: char| c.is_ascii_punctuation());
    if trimmed.is_empty() {
        return Ok(None);
    }
    let offset = lower.find(trimmed).unwrap_or(0);
    match classify_word(trimmed, position + offset)? {
        Some(kind) => Ok(Some(Token::new(kind, trimmed, position + offset))),
        None => Err(ParseError::lex(word, position)),
    }
}

fn classify_word(word: &str, position: usize) -> Result<Option<TokenKind>> {
    if let Some(keyword) = lexicon::parse_keyword(word) {
        return Ok(Some(TokenKind::Keyword(keyword)));
    }
    if let Some(month) = lexicon::parse_month(word) {
        return Ok(Some(TokenKind::MonthName(month)));
    }
    if let Some(weekday) = lexicon::parse_weekday(word) {
        return Ok(Some(TokenKind::WeekdayName(weekday)));
    }
    if let Some(unit) = lexicon::parse_unit(word) {
        return Ok(Some(TokenKind::Unit(unit)));
    }
    if let Some(meridiem) = lexicon::parse_meridiem(word) {
        return Ok(Some(TokenKind::Meridiem(meridiem)));
    }
    if let Some(digits) = lexicon::strip_ordinal_suffix(word) {
        let n: u32 = digits
            .parse()
            .map_err(|_| ParseError::lex(word, position))?;
        return Ok(Some(TokenKind::Number(n)));
    }
    Ok(parse_clock(word).map(TokenKind::ClockTime))
}

/// Parse a compact clock word: "5am", "9:30pm", "14:00", "9:30:15".
/// A bare digit run is a number, not a clock, so a colon or meridiem is
/// required.
fn parse_clock(word: &str) -> Option<ClockTime> {
    let (body, meridiem) = ["a.m.", "p.m.", "am", "pm"]
        .iter()
        .find_map(|suffix| {
            let body = word.strip_suffix(suffix)?;
            Some((body, lexicon::parse_meridiem(suffix)))
        })
        .unwrap_or((word, None));

    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() > 3 || (meridiem.is_none() && parts.len() < 2) {
        return None;
    }
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !parts.iter().all(|p| all_digits(p)) || parts[0].len() > 2 {
        return None;
    }
    if parts[1..].iter().any(|p| p.len() != 2) {
        return None;
    }

    Some(ClockTime {
        hour: parts[0].parse().ok()?,
        minute: parts.get(1).and_then(|s| s.parse().ok()),
        second: parts.get(2).and_then(|s| s.parse().ok()),
        meridiem,
    })
}

/// Fold "2 pm" and "9:30 pm" into single clock tokens.
fn merge_meridiems(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let TokenKind::Meridiem(meridiem) = token.kind {
            if let Some(prev) = merged.last_mut() {
                let clock = match prev.kind {
                    TokenKind::Number(hour) if prev.text.bytes().all(|b| b.is_ascii_digit()) => {
                        Some(ClockTime {
                            hour,
                            minute: None,
                            second: None,
                            meridiem: Some(meridiem),
                        })
                    }
                    TokenKind::ClockTime(clock) if clock.meridiem.is_none() => Some(ClockTime {
                        meridiem: Some(meridiem),
                        ..clock
                    }),
                    _ => None,
                };
                if let Some(clock) = clock {
                    prev.kind = TokenKind::ClockTime(clock);
                    prev.text = format!("{} {}", prev.text, token.text);
                    continue;
                }
            }
        }
        merged.push(token);
    }
    merged
}
