//! Query lexer (tokenizer).
//!
//! Converts a query string into a flat stream of tokens for the parser. Quoting and
//! escaping are resolved here so that operator characters inside values never reach the
//! parser as operators.

use std::{fmt, iter::Peekable, str::Chars};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    ast::{Term, quote_value},
    error::{LexError, LexErrorKind},
};

/// Characters that end an unquoted value.
const RESERVED: [char; 7] = ['+', '*', '(', ')', '=', '"', '\''];

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "UPPERCASE")]
pub enum Token {
    /// A whitelisted keyword.
    Term(Term),

    /// The `=` separator.
    Equal,

    /// A value (quotes stripped, escapes resolved).
    String(String),

    /// The OR operator (`+`).
    Or,

    /// The AND operator (`*`).
    And,

    /// Left parenthesis.
    LParen,

    /// Right parenthesis.
    RParen,
}

impl Token {
    /// Returns the payload-free kind of this token.
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Term(_) => TokenKind::Term,
            Self::Equal => TokenKind::Equal,
            Self::String(_) => TokenKind::String,
            Self::Or => TokenKind::Or,
            Self::And => TokenKind::And,
            Self::LParen => TokenKind::LParen,
            Self::RParen => TokenKind::RParen,
        }
    }

    /// Returns query text that lexes back to this token. Values are always double-quoted.
    pub fn source_text(&self) -> String {
        match self {
            Self::Term(term) => term.as_str().to_string(),
            Self::Equal => "=".to_string(),
            Self::String(value) => quote_value(value),
            Self::Or => "+".to_string(),
            Self::And => "*".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
        }
    }
}

/// The kind of a [`Token`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// See [`Token::Term`].
    Term,
    /// See [`Token::Equal`].
    Equal,
    /// See [`Token::String`].
    String,
    /// See [`Token::Or`].
    Or,
    /// See [`Token::And`].
    And,
    /// See [`Token::LParen`].
    LParen,
    /// See [`Token::RParen`].
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Term => "TERM",
            Self::Equal => "EQUAL",
            Self::String => "STRING",
            Self::Or => "OR",
            Self::And => "AND",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
        };
        f.write_str(name)
    }
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
    /// Tokens emitted so far.
    tokens: Vec<Token>,
    /// Positions of `(` not yet closed.
    open_parens: Vec<usize>,
    /// Positions of `)` seen while no `(` was open.
    stray_parens: Vec<usize>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
            tokens: Vec::new(),
            open_parens: Vec::new(),
            stray_parens: Vec::new(),
        }
    }

    /// Creates an error at a specific position.
    fn error_at(&self, kind: LexErrorKind, position: usize) -> LexError {
        LexError::new(kind, position, self.input)
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        self.skip_whitespace();
        while self.peek().is_some() {
            self.read_chain()?;
        }
        self.check_balance()?;
        Ok(self.tokens)
    }

    /// Reads expressions joined by `+` or `*` until one is not followed by an operator.
    fn read_chain(&mut self) -> Result<(), LexError> {
        loop {
            self.read_expression()?;
            self.skip_whitespace();

            let operator = match self.peek() {
                Some('+') => Token::Or,
                Some('*') => Token::And,
                _ => return Ok(()),
            };
            self.advance();
            self.tokens.push(operator);
        }
    }

    /// Reads `(* term = value )*`, emitting a token for each part.
    fn read_expression(&mut self) -> Result<(), LexError> {
        self.skip_whitespace();
        while self.peek() == Some('(') {
            self.open_parens.push(self.position);
            self.advance();
            self.tokens.push(Token::LParen);
            self.skip_whitespace();
        }

        let term = self.read_term()?;
        self.tokens.push(Token::Term(term));

        self.skip_whitespace();
        if self.peek() != Some('=') {
            return Err(self.error_at(LexErrorKind::MissingEquals, self.position));
        }
        self.advance();
        self.tokens.push(Token::Equal);

        self.skip_whitespace();
        let value = self.read_value()?;
        self.tokens.push(Token::String(value));

        self.read_closing_parens();
        Ok(())
    }

    /// Reads a maximal run of ASCII letters and checks it against the keyword whitelist.
    fn read_term(&mut self) -> Result<Term, LexError> {
        let start_pos = self.position;
        let mut word = String::new();

        while let Some(ch) = self.peek().filter(char::is_ascii_alphabetic) {
            word.push(ch);
            self.advance();
        }

        Term::from_keyword(&word)
            .ok_or_else(|| self.error_at(LexErrorKind::UnknownKeyword { found: word }, start_pos))
    }

    /// Reads a quoted or bare value.
    fn read_value(&mut self) -> Result<String, LexError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.read_quoted(quote),
            _ => self.read_bare(),
        }
    }

    /// Reads a value enclosed in `quote`, resolving `\X` escapes.
    fn read_quoted(&mut self, quote: char) -> Result<String, LexError> {
        let start_pos = self.position;
        self.advance(); // consume opening quote

        let mut content = String::new();

        while let Some(ch) = self.next_char() {
            match ch {
                '\\' => match self.next_char() {
                    Some(escaped) => content.push(escaped),
                    None => break,
                },
                _ if ch == quote => return Ok(content),
                _ => content.push(ch),
            }
        }

        Err(self.error_at(LexErrorKind::UnterminatedQuote, start_pos))
    }

    /// Reads an unquoted value up to whitespace or a reserved character.
    fn read_bare(&mut self) -> Result<String, LexError> {
        let start_pos = self.position;
        let mut content = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || RESERVED.contains(&ch) {
                break;
            }
            self.advance();
            if ch == '\\' {
                // A trailing backslash has nothing to escape and stays literal.
                content.push(self.next_char().unwrap_or('\\'));
            } else {
                content.push(ch);
            }
        }

        if self.position == start_pos {
            return Err(self.error_at(LexErrorKind::MissingValue, start_pos));
        }

        Ok(content)
    }

    /// Consumes any `)` following a value.
    fn read_closing_parens(&mut self) {
        loop {
            self.skip_whitespace();
            if self.peek() != Some(')') {
                return;
            }
            if self.open_parens.pop().is_none() {
                self.stray_parens.push(self.position);
            }
            self.advance();
            self.tokens.push(Token::RParen);
        }
    }

    /// Checks that the cumulative `(` and `)` counts agree.
    ///
    /// Only the counts are compared; ordering mistakes such as `a) + (b` are left to the
    /// parser.
    fn check_balance(&self) -> Result<(), LexError> {
        if self.open_parens.len() == self.stray_parens.len() {
            return Ok(());
        }

        let position = if self.open_parens.len() > self.stray_parens.len() {
            self.open_parens.first()
        } else {
            self.stray_parens.first()
        };

        Err(self.error_at(
            LexErrorKind::UnbalancedParens,
            position.copied().unwrap_or(self.position),
        ))
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Returns the current character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consumes and returns the current character.
    fn next_char(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Tokenizes a query string.
///
/// Fails on the first malformation: an unknown keyword, a missing `=`, an unclosed quote, an
/// empty unquoted value, or unbalanced parentheses.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    match Lexer::new(input).tokenize() {
        Ok(tokens) => {
            debug!(tokens = tokens.len(), "tokenized query");
            Ok(tokens)
        }
        Err(err) => {
            debug!(error = %err.kind, position = err.position, "failed to tokenize query");
            Err(err)
        }
    }
}
