//! Query parser.
//!
//! Parses a token stream into a binary query AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query    → or_expr
//! or_expr  → and_expr ("+" and_expr)*
//! and_expr → atom ("*" atom)*
//! atom     → "(" or_expr ")" | TERM "=" STRING
//! ```
//!
//! # Precedence (highest to lowest)
//!
//! 1. Grouping: `(...)`
//! 2. AND: `*`
//! 3. OR: `+`
//!
//! Both operators are left-associative: `a + b + c` parses as `(a + b) + c`.

use tracing::debug;

use crate::{
    ast::{AstNode, Term},
    error::{ParseError, ParseErrorKind, QueryError},
    lexer::{Token, TokenKind, tokenize},
};

/// Default maximum parenthesis nesting accepted by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Recursive descent parser for query expressions.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
    /// Number of groups currently open.
    depth: usize,
    /// Maximum value `depth` may reach.
    max_depth: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>, max_depth: usize) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Parses the token stream into a query expression.
    fn parse(mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_or_expr()?;

        match self.peek() {
            None => Ok(expr),
            Some(Token::RParen) => Err(self.error(ParseErrorKind::UnbalancedParens)),
            Some(token) => {
                let found = token.kind();
                Err(self.error(ParseErrorKind::UnexpectedToken { found }))
            }
        }
    }

    /// Parses: or_expr → and_expr ("+" and_expr)*
    fn parse_or_expr(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_and_expr()?;

        while self.check(TokenKind::Or) {
            self.advance(); // consume +
            let right = self.parse_and_expr()?;
            left = AstNode::or(left, right);
        }

        Ok(left)
    }

    /// Parses: and_expr → atom ("*" atom)*
    fn parse_and_expr(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_atom()?;

        while self.check(TokenKind::And) {
            self.advance(); // consume *
            let right = self.parse_atom()?;
            left = AstNode::and(left, right);
        }

        Ok(left)
    }

    /// Parses: atom → "(" or_expr ")" | TERM "=" STRING
    fn parse_atom(&mut self) -> Result<AstNode, ParseError> {
        if self.check(TokenKind::LParen) {
            return self.parse_group();
        }

        let term = self.expect_term()?;
        self.expect_equal()?;
        let value = self.expect_value()?;

        Ok(AstNode::expression(term, value))
    }

    /// Parses a parenthesized group, consuming the surrounding parentheses.
    fn parse_group(&mut self) -> Result<AstNode, ParseError> {
        if self.depth >= self.max_depth {
            return Err(self.error(ParseErrorKind::NestingTooDeep {
                limit: self.max_depth,
            }));
        }

        self.advance(); // consume (
        self.depth += 1;
        let inner = self.parse_or_expr()?;

        if !self.check(TokenKind::RParen) {
            return Err(self.error(ParseErrorKind::UnbalancedParens));
        }
        self.advance(); // consume )
        self.depth -= 1;

        Ok(inner)
    }

    /// Consumes a TERM token.
    fn expect_term(&mut self) -> Result<Term, ParseError> {
        match self.peek() {
            Some(Token::Term(term)) => {
                let term = *term;
                self.advance();
                Ok(term)
            }
            other => {
                let found = other.map(Token::kind);
                Err(self.error(ParseErrorKind::ExpectedTerm { found }))
            }
        }
    }

    /// Consumes an EQUAL token.
    fn expect_equal(&mut self) -> Result<(), ParseError> {
        if self.check(TokenKind::Equal) {
            self.advance();
            return Ok(());
        }
        let found = self.peek().map(Token::kind);
        Err(self.error(ParseErrorKind::ExpectedEqual { found }))
    }

    /// Consumes a STRING token, returning its value.
    fn expect_value(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::String(value)) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            other => {
                let found = other.map(Token::kind);
                Err(self.error(ParseErrorKind::ExpectedValue { found }))
            }
        }
    }

    /// Builds an error pointing at the current token.
    fn error(&self, kind: ParseErrorKind) -> ParseError {
        let index = (self.position < self.tokens.len()).then_some(self.position);
        ParseError::new(kind, index)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Checks if the current token is of the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind() == kind)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Parses a token stream into an AST.
///
/// Fails on the first token that does not fit the grammar; no partial tree is returned.
pub fn parse(tokens: Vec<Token>) -> Result<AstNode, ParseError> {
    parse_with_max_depth(tokens, DEFAULT_MAX_DEPTH)
}

/// Parses a token stream, allowing at most `max_depth` levels of nested parentheses.
pub fn parse_with_max_depth(tokens: Vec<Token>, max_depth: usize) -> Result<AstNode, ParseError> {
    match Parser::new(tokens, max_depth).parse() {
        Ok(expr) => {
            debug!(
                expressions = expr.expression_count(),
                depth = expr.depth(),
                "parsed query"
            );
            Ok(expr)
        }
        Err(err) => {
            debug!(error = %err.kind, token = ?err.token_index, "failed to parse query");
            Err(err)
        }
    }
}

/// Tokenizes and parses a query string.
///
/// Either stage's error is converted to a [`QueryError`] that carries the query text.
pub fn parse_query(input: &str) -> Result<AstNode, QueryError> {
    let tokens = tokenize(input)?;
    parse(tokens).map_err(|err| QueryError::from(err).with_query(input))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::error::{LexErrorKind, QueryErrorKind};

    fn title(v: &str) -> AstNode {
        AstNode::expression(Term::Title, v)
    }

    fn body(v: &str) -> AstNode {
        AstNode::expression(Term::Body, v)
    }

    fn issued(v: &str) -> AstNode {
        AstNode::expression(Term::Issued, v)
    }

    fn and(l: AstNode, r: AstNode) -> AstNode {
        AstNode::and(l, r)
    }

    fn or(l: AstNode, r: AstNode) -> AstNode {
        AstNode::or(l, r)
    }

    fn pair(t: Term, v: &str) -> Vec<Token> {
        vec![Token::Term(t), Token::Equal, Token::String(v.into())]
    }

    fn parse_kind(tokens: Vec<Token>) -> ParseErrorKind {
        parse(tokens).unwrap_err().kind
    }

    fn lex_kind(input: &str) -> LexErrorKind {
        match parse_query(input).unwrap_err().kind {
            QueryErrorKind::Lex { error, .. } => error,
            other => panic!("expected lex error, got {other:?}"),
        }
    }

    fn syntax_kind(input: &str) -> ParseErrorKind {
        match parse_query(input).unwrap_err().kind {
            QueryErrorKind::Parse { error, .. } => error,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn parse_token_stream() {
        assert_eq!(parse(pair(Term::Title, "test")).unwrap(), title("test"));
    }

    #[test]
    fn single_expression() {
        assert_eq!(parse_query("title=test").unwrap(), title("test"));
    }

    #[test]
    fn chained_or_is_left_associative() {
        assert_eq!(
            parse_query("title=test + body = some + issued=\">=2024-01-01\"").unwrap(),
            or(or(title("test"), body("some")), issued(">=2024-01-01"))
        );
    }

    #[test]
    fn chained_and_is_left_associative() {
        assert_eq!(
            parse_query("title=a * body=b * issued=c").unwrap(),
            and(and(title("a"), body("b")), issued("c"))
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            parse_query("title=a + body=b * issued=c").unwrap(),
            or(title("a"), and(body("b"), issued("c")))
        );
        assert_eq!(
            parse_query("title=a * body=b + issued=c").unwrap(),
            or(and(title("a"), body("b")), issued("c"))
        );
    }

    #[test]
    fn mixed_precedence_chain() {
        assert_eq!(
            parse_query("title=test + body=some * issued=\">=2024-01-01\" + title=abc").unwrap(),
            or(
                or(title("test"), and(body("some"), issued(">=2024-01-01"))),
                title("abc")
            )
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            parse_query("(title=a + body=b) * issued=c").unwrap(),
            and(or(title("a"), body("b")), issued("c"))
        );
    }

    #[test]
    fn nested_groups() {
        assert_eq!(
            parse_query(
                "((title=\"test\" + body=\"test\")+(title=\"sample\" + body=\"sample\"))*issued=\">=2024-01-01\""
            )
            .unwrap(),
            and(
                or(
                    or(title("test"), body("test")),
                    or(title("sample"), body("sample"))
                ),
                issued(">=2024-01-01")
            )
        );
    }

    #[test]
    fn redundant_group_is_transparent() {
        assert_eq!(parse_query("((title=a))").unwrap(), title("a"));
    }

    #[test]
    fn right_group_keeps_shape() {
        assert_eq!(
            parse_query("title=a + (body=b + issued=c)").unwrap(),
            or(title("a"), or(body("b"), issued("c")))
        );
    }

    #[test]
    fn quoted_values_and_escapes() {
        assert_eq!(
            parse_query(r#"title="test + test2" + body = "test \" test2""#).unwrap(),
            or(title("test + test2"), body("test \" test2"))
        );
    }

    #[test]
    fn empty_quoted_values() {
        assert_eq!(
            parse_query(r#"title=""+body="""#).unwrap(),
            or(title(""), body(""))
        );
    }

    #[test]
    fn operators_inside_quotes_are_inert() {
        assert_eq!(parse_query(r#"title="a+b*c""#).unwrap(), title("a+b*c"));
    }

    #[test]
    fn error_empty_stream() {
        assert_eq!(
            parse_kind(vec![]),
            ParseErrorKind::ExpectedTerm { found: None }
        );
        let err = parse_query("   ").unwrap_err();
        assert_eq!(err.message(), "expected TERM, got EOF");
    }

    #[test]
    fn error_expected_term() {
        let err = parse(vec![Token::Equal]).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::ExpectedTerm {
                found: Some(TokenKind::Equal)
            }
        );
        assert_eq!(err.token_index, Some(0));
    }

    #[test]
    fn error_expected_equal() {
        assert_eq!(
            parse_kind(vec![Token::Term(Term::Title), Token::String("x".into())]),
            ParseErrorKind::ExpectedEqual {
                found: Some(TokenKind::String)
            }
        );
        assert_eq!(
            parse_kind(vec![Token::Term(Term::Title)]),
            ParseErrorKind::ExpectedEqual { found: None }
        );
    }

    #[test]
    fn error_expected_value() {
        let err = parse(vec![Token::Term(Term::Body), Token::Equal, Token::Or]).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::ExpectedValue {
                found: Some(TokenKind::Or)
            }
        );
        assert_eq!(err.token_index, Some(2));
    }

    #[test]
    fn error_operator_without_right_operand() {
        let mut tokens = pair(Term::Title, "a");
        tokens.push(Token::And);
        let err = parse(tokens).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedTerm { found: None });
        assert_eq!(err.token_index, None);
    }

    #[test]
    fn error_unclosed_group() {
        let mut tokens = vec![Token::LParen];
        tokens.extend(pair(Term::Title, "a"));
        assert_eq!(parse_kind(tokens), ParseErrorKind::UnbalancedParens);
    }

    #[test]
    fn error_stray_rparen_at_top_level() {
        let mut tokens = pair(Term::Title, "a");
        tokens.push(Token::RParen);
        let err = parse(tokens).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedParens);
        assert_eq!(err.token_index, Some(3));
    }

    #[test]
    fn error_misordered_parens() {
        assert_eq!(
            syntax_kind("title=a) + (body=b"),
            ParseErrorKind::UnbalancedParens
        );
    }

    #[test]
    fn error_juxtaposed_expressions() {
        assert_eq!(
            syntax_kind("title=a body=b"),
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Term
            }
        );
    }

    #[test]
    fn error_nesting_limit() {
        let mut tokens = vec![Token::LParen; 3];
        tokens.extend(pair(Term::Title, "a"));
        tokens.extend(vec![Token::RParen; 3]);

        assert_eq!(
            parse_with_max_depth(tokens.clone(), 2).unwrap_err().kind,
            ParseErrorKind::NestingTooDeep { limit: 2 }
        );
        assert_eq!(parse_with_max_depth(tokens, 3).unwrap(), title("a"));
    }

    #[test]
    fn deep_nesting_fails_cleanly() {
        let depth = DEFAULT_MAX_DEPTH + 1;
        let query = format!("{}title=a{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            syntax_kind(&query),
            ParseErrorKind::NestingTooDeep {
                limit: DEFAULT_MAX_DEPTH
            }
        );
    }

    #[test]
    fn lex_errors_surface_first() {
        assert!(matches!(lex_kind(")"), LexErrorKind::UnknownKeyword { .. }));
        assert!(matches!(
            lex_kind("subject=aaa"),
            LexErrorKind::UnknownKeyword { .. }
        ));
        assert_eq!(lex_kind("title+aaa"), LexErrorKind::MissingEquals);
        assert_eq!(lex_kind("title=\"aaa"), LexErrorKind::UnterminatedQuote);
        assert_eq!(lex_kind("(title=a"), LexErrorKind::UnbalancedParens);
    }

    #[test]
    fn parse_error_carries_query() {
        let err = parse_query("title=a body=b").unwrap_err();
        assert_eq!(err.query.as_deref(), Some("title=a body=b"));
    }

    #[test]
    fn query_string_round_trip() {
        let queries = [
            "title=test",
            "title=a + body=b + issued=c",
            "title=a + (body=b + issued=c)",
            "(title=a + body=b) * issued=c",
            "title=a * (body=b * issued=c)",
            r#"title="x \" y" * (body='a\\b' + issued=">=2024-01-01")"#,
        ];

        for query in queries {
            let ast = parse_query(query).unwrap();
            let reparsed = parse_query(&ast.to_query_string()).unwrap();
            assert_eq!(reparsed, ast, "{query}");
        }
    }

    #[test]
    fn long_flat_chain_is_stack_safe() {
        let n = 100_000;
        for op in ["+", "*"] {
            let query = vec!["title=a"; n].join(op);
            let ast = parse_query(&query).unwrap();
            assert_eq!(ast.expression_count(), n);
            assert_eq!(ast.depth(), n);
            assert_eq!(ast.to_query_string().len(), n * 7 + (n - 1) * 3);
            drop(ast);
        }
    }

    #[test]
    fn long_chain_renders_tree_without_recursion() {
        let ast = parse_query(&vec!["body=x"; 2_000].join("*")).unwrap();
        let tree = ast.to_string();
        assert_eq!(tree.lines().count(), 2_000 * 2 - 1);
        assert!(tree.starts_with("And\n"));
    }

    #[test]
    fn performance_many_queries() {
        let queries = [
            "title=rust",
            "title=a + body=b * issued=c",
            "((title=\"test\" + body=\"test\")+(title=\"sample\" + body=\"sample\"))*issued=\">=2024-01-01\"",
            r#"body="escaped \" quote" + title=plain\ text"#,
        ];

        let start = Instant::now();
        for _ in 0..2500 {
            for query in &queries {
                let _ = parse_query(query).unwrap();
            }
        }
        let elapsed = start.elapsed();

        assert!(
            elapsed.as_millis() < 1000,
            "Parsing 10,000 queries took {:?}, expected < 1s",
            elapsed
        );
    }
}
