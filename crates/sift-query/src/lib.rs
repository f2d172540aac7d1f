//! Lexer, parser and AST for sift search expressions.
//!
//! A search expression joins `keyword=value` pairs with boolean operators:
//!
//! - **Pairs**: `title=rust` - the keyword is one of `title`, `body`, `issued`
//! - **Quoting**: `body="error handling"` or `body='a+b'` - operators inside quotes are text
//! - **Escapes**: `title=a\+b`, `title="say \"hi\""` - `\X` is a literal `X`
//! - **AND**: `title=rust * body=async` - binds tighter than OR
//! - **OR**: `title=rust + title=golang`
//! - **Grouping**: `(title=a + title=b) * issued=">=2024-01-01"` - precedence control
//!
//! Parsing happens in two stages, [`tokenize`] and [`parse`], which can also be run
//! together with [`parse_query`].
//!
//! # Example
//!
//! ```
//! use sift_query::{AstNode, parse_query};
//!
//! let expr = parse_query("title=guide * (body=rust + body=golang)").unwrap();
//! assert!(matches!(expr, AstNode::And { .. }));
//! assert_eq!(expr.expression_count(), 3);
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{AstNode, Term};
pub use error::{LexError, LexErrorKind, ParseError, ParseErrorKind, QueryError, QueryErrorKind};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{DEFAULT_MAX_DEPTH, parse, parse_query, parse_with_max_depth};
