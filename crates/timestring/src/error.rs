//! Error types for time-expression parsing.

use thiserror::Error;

/// Category of a [`ParseError`], independent of the input that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A run of characters matched no lexical category.
    Lex,
    /// The token sequence matched no grammar rule.
    Grammar,
    /// A count was given without a recognizable unit ("next 5").
    AmbiguousUnit,
    /// The expression was well formed but names an impossible date or range.
    Semantic,
    /// The configured timezone is not a known IANA zone.
    Timezone,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognized text '{fragment}' at position {position} in '{input}'")]
    Lex {
        input: String,
        fragment: String,
        position: usize,
    },

    #[error("No rule matches '{input}'")]
    Grammar { input: String },

    #[error("Number at position {position} has no unit in '{input}'")]
    AmbiguousUnit { input: String, position: usize },

    #[error("Invalid date in '{input}': {message}")]
    Semantic { input: String, message: String },

    #[error("Invalid timezone: '{0}'")]
    InvalidTimezone(String),
}

impl ParseError {
    pub(crate) fn lex(fragment: &str, position: usize) -> Self {
        ParseError::Lex {
            input: String::new(),
            fragment: fragment.to_string(),
            position,
        }
    }

    pub(crate) fn grammar() -> Self {
        ParseError::Grammar {
            input: String::new(),
        }
    }

    pub(crate) fn ambiguous_unit(position: usize) -> Self {
        ParseError::AmbiguousUnit {
            input: String::new(),
            position,
        }
    }

    pub(crate) fn semantic(message: impl Into<String>) -> Self {
        ParseError::Semantic {
            input: String::new(),
            message: message.into(),
        }
    }

    /// Attach the original expression. Stages raise errors without it; the
    /// entry point fills it in once.
    pub(crate) fn with_input(mut self, text: &str) -> Self {
        match &mut self {
            ParseError::Lex { input, .. }
            | ParseError::Grammar { input }
            | ParseError::AmbiguousUnit { input, .. }
            | ParseError::Semantic { input, .. } => *input = text.to_string(),
            ParseError::InvalidTimezone(_) => {}
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Lex { .. } => ErrorKind::Lex,
            ParseError::Grammar { .. } => ErrorKind::Grammar,
            ParseError::AmbiguousUnit { .. } => ErrorKind::AmbiguousUnit,
            ParseError::Semantic { .. } => ErrorKind::Semantic,
            ParseError::InvalidTimezone(_) => ErrorKind::Timezone,
        }
    }

    /// The expression that failed to parse. Empty for timezone errors, which
    /// are raised before any text is read.
    pub fn input(&self) -> &str {
        match self {
            ParseError::Lex { input, .. }
            | ParseError::Grammar { input }
            | ParseError::AmbiguousUnit { input, .. }
            | ParseError::Semantic { input, .. } => input,
            ParseError::InvalidTimezone(_) => "",
        }
    }

    /// What went wrong, without the input text that [`Display`] adds.
    ///
    /// [`Display`]: std::fmt::Display
    pub fn message(&self) -> String {
        match self {
            ParseError::Lex { fragment, .. } => format!("unrecognized text '{fragment}'"),
            ParseError::Grammar { .. } => "no rule matches".to_string(),
            ParseError::AmbiguousUnit { .. } => "number has no unit".to_string(),
            ParseError::Semantic { message, .. } => message.clone(),
            ParseError::InvalidTimezone(name) => format!("unknown timezone '{name}'"),
        }
    }

    /// Byte offset of the offending token, when one can be pinned down.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::Lex { position, .. } | ParseError::AmbiguousUnit { position, .. } => {
                Some(*position)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
