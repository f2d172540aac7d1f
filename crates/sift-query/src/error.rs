//! Error types for query lexing and parsing.
//!
//! Lexer errors carry a byte position into the original input; parser errors carry the index
//! of the offending token. [`QueryError`] unifies both for display to the person who typed
//! the query.

use std::{error::Error, fmt};

use thiserror::Error;

use crate::lexer::TokenKind;

/// The kind of lexical failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// The current position does not start a whitelisted keyword.
    #[error("unknown keyword{}", quoted_word(.found))]
    UnknownKeyword {
        /// The run of letters found instead (empty when there were none).
        found: String,
    },

    /// A keyword was not followed by `=`.
    #[error("expected '=' after keyword")]
    MissingEquals,

    /// End of input was reached inside a quoted value.
    #[error("unclosed quote")]
    UnterminatedQuote,

    /// An unquoted value was empty.
    #[error("missing value after '='")]
    MissingValue,

    /// The numbers of `(` and `)` differ.
    #[error("unbalanced parentheses")]
    UnbalancedParens,
}

/// Formats the offending word for an unknown-keyword message.
fn quoted_word(found: &str) -> String {
    if found.is_empty() {
        String::new()
    } else {
        format!(" '{found}'")
    }
}

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// What went wrong.
    pub kind: LexErrorKind,
    /// Byte position in input where error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(kind: LexErrorKind, position: usize, input: &str) -> Self {
        Self {
            kind,
            position,
            input: input.to_string(),
        }
    }

    /// Returns the error message without context.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Formats the error with a position indicator showing where the error occurred.
    pub fn format_with_context(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!("query syntax error: {}\n", self.kind));
        result.push_str(&format!("  {}\n", self.input));
        result.push_str(&format!("  {}^", " ".repeat(caret_offset(&self.input, self.position))));
        result
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_context())
    }
}

impl Error for LexError {}

/// The kind of syntactic failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A keyword was expected.
    #[error("expected TERM, got {}", found_name(.found))]
    ExpectedTerm {
        /// The token found instead, `None` at end of input.
        found: Option<TokenKind>,
    },

    /// `=` was expected after a keyword.
    #[error("expected EQUAL, got {}", found_name(.found))]
    ExpectedEqual {
        /// The token found instead, `None` at end of input.
        found: Option<TokenKind>,
    },

    /// A value was expected after `=`.
    #[error("expected STRING, got {}", found_name(.found))]
    ExpectedValue {
        /// The token found instead, `None` at end of input.
        found: Option<TokenKind>,
    },

    /// A group was not closed, or a `)` has no matching `(`.
    #[error("unbalanced parentheses")]
    UnbalancedParens,

    /// Tokens remain after a complete expression.
    #[error("expected OR or AND, got {found}")]
    UnexpectedToken {
        /// The leftover token.
        found: TokenKind,
    },

    /// Groups are nested deeper than the parser allows.
    #[error("parentheses nested deeper than {limit} levels")]
    NestingTooDeep {
        /// The nesting limit in force.
        limit: usize,
    },
}

/// Names a found token kind, using `EOF` for end of input.
fn found_name(found: &Option<TokenKind>) -> String {
    found.map_or_else(|| "EOF".to_string(), |kind| kind.to_string())
}

/// Parse error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Token index where error occurred (`None` at end of input).
    pub token_index: Option<usize>,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, token_index: Option<usize>) -> Self {
        Self { kind, token_index }
    }

    /// Returns the error message without context.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(idx) = self.token_index {
            write!(f, "at token {}: {}", idx, self.kind)
        } else {
            write!(f, "at end of query: {}", self.kind)
        }
    }
}

impl Error for ParseError {}

/// A unified error type for query handling.
///
/// This type provides detailed error messages with context, including
/// the original query string and position indicators where applicable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The original query string (if available).
    pub query: Option<String>,
}

/// The specific kind of query error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Lexer error (tokenization failed).
    Lex {
        /// What went wrong.
        error: LexErrorKind,
        /// Byte position in input.
        position: usize,
    },
    /// Parser error (invalid token sequence).
    Parse {
        /// What went wrong.
        error: ParseErrorKind,
        /// Token index, `None` at end of input.
        token_index: Option<usize>,
    },
    /// The query was rejected before lexing because it is too long.
    TooLong {
        /// Query length in bytes.
        length: usize,
        /// Configured maximum length in bytes.
        limit: usize,
    },
}

impl QueryError {
    /// Creates an error for a query exceeding the length limit.
    pub fn too_long(length: usize, limit: usize) -> Self {
        Self {
            kind: QueryErrorKind::TooLong { length, limit },
            query: None,
        }
    }

    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> String {
        match &self.kind {
            QueryErrorKind::Lex { error, .. } => error.to_string(),
            QueryErrorKind::Parse { error, .. } => error.to_string(),
            QueryErrorKind::TooLong { length, limit } => {
                format!("query is {length} bytes long, limit is {limit}")
            }
        }
    }

    /// Returns the byte position the error points at, when known.
    pub fn position(&self) -> Option<usize> {
        match &self.kind {
            QueryErrorKind::Lex { position, .. } => Some(*position),
            QueryErrorKind::Parse { .. } | QueryErrorKind::TooLong { .. } => None,
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            QueryErrorKind::Lex { error, .. } => match error {
                LexErrorKind::UnknownKeyword { .. } => {
                    Some("Valid keywords are: title, body, issued")
                }
                LexErrorKind::UnterminatedQuote => {
                    Some("Add a closing quote to complete the value")
                }
                LexErrorKind::MissingValue => {
                    Some("Quote the value, e.g. title=\"\" for an empty string")
                }
                LexErrorKind::UnbalancedParens => {
                    Some("Check that every '(' has a matching ')'")
                }
                LexErrorKind::MissingEquals => None,
            },
            QueryErrorKind::Parse { error, .. } => match error {
                ParseErrorKind::UnbalancedParens => {
                    Some("Check that every '(' has a matching ')'")
                }
                ParseErrorKind::UnexpectedToken { .. } => {
                    Some("Join expressions with + (OR) or * (AND)")
                }
                _ => None,
            },
            QueryErrorKind::TooLong { .. } => None,
        }
    }
}

/// Converts a byte position into a caret column, counting characters.
fn caret_offset(input: &str, position: usize) -> usize {
    let clamped = position.min(input.len());
    input
        .char_indices()
        .take_while(|(idx, _)| *idx < clamped)
        .count()
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match &self.kind {
            QueryErrorKind::Lex { .. } | QueryErrorKind::Parse { .. } => "query syntax error",
            QueryErrorKind::TooLong { .. } => "query rejected",
        };

        writeln!(f, "{}: {}", prefix, self.message())?;

        // If we have a query and position, show it with a pointer
        if let Some(query) = &self.query {
            writeln!(f, "  {}", query)?;
            if let Some(pos) = self.position() {
                writeln!(f, "  {}^", " ".repeat(caret_offset(query, pos)))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "hint: {}", suggestion)?;
        }

        Ok(())
    }
}

impl Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                error: err.kind,
                position: err.position,
            },
            query: Some(err.input),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                error: err.kind,
                token_index: err.token_index,
            },
            query: None,
        }
    }
}
