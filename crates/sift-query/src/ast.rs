//! Query abstract syntax tree.
//!
//! Represents parsed search expressions before they are handed to an evaluator or
//! translated into a backend query.

use std::{fmt, mem};

use serde::{Deserialize, Serialize};

/// A searchable keyword: the left-hand side of a `term=value` pair.
///
/// The set is closed; the lexer rejects any other identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    /// Document title.
    Title,
    /// Document body text.
    Body,
    /// Issue date.
    Issued,
}

impl Term {
    /// Every accepted keyword, in canonical order.
    pub const ALL: [Self; 3] = [Self::Title, Self::Body, Self::Issued];

    /// Returns the keyword as written in a query.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Body => "body",
            Self::Issued => "issued",
        }
    }

    /// Looks up a keyword. Matching is case-sensitive.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|term| term.as_str() == word)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed search expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum AstNode {
    /// A single `term=value` pair.
    Expression {
        /// Keyword being matched.
        term: Term,
        /// Decoded value (quotes stripped, escapes resolved).
        value: String,
    },

    /// Conjunction: both sides must match.
    And {
        /// Left operand.
        left: Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },

    /// Disjunction: at least one side must match.
    Or {
        /// Left operand.
        left: Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },
}

impl AstNode {
    /// Creates a leaf expression.
    pub fn expression(term: Term, value: impl Into<String>) -> Self {
        Self::Expression {
            term,
            value: value.into(),
        }
    }

    /// Creates a conjunction of two subtrees.
    pub fn and(left: Self, right: Self) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a disjunction of two subtrees.
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Returns the height of the tree. A lone expression has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some((left, right)) = node.children() {
                stack.push((right, level + 1));
                stack.push((left, level + 1));
            }
        }
        deepest
    }

    /// Returns the number of `term=value` leaves in the tree.
    pub fn expression_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node.children() {
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => count += 1,
            }
        }
        count
    }

    /// Returns both operands of an `And` or `Or` node.
    fn children(&self) -> Option<(&Self, &Self)> {
        match self {
            Self::Expression { .. } => None,
            Self::And { left, right } | Self::Or { left, right } => Some((&**left, &**right)),
        }
    }

    /// Writes one line per node, children indented two spaces below their parent.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self, 0)];
        while let Some((node, indent)) = stack.pop() {
            let prefix = "  ".repeat(indent);
            match node {
                Self::Expression { term, value } => {
                    writeln!(f, "{prefix}Expression({term} = {value:?})")?;
                }
                Self::And { left, right } => {
                    writeln!(f, "{prefix}And")?;
                    stack.push((&**right, indent + 1));
                    stack.push((&**left, indent + 1));
                }
                Self::Or { left, right } => {
                    writeln!(f, "{prefix}Or")?;
                    stack.push((&**right, indent + 1));
                    stack.push((&**left, indent + 1));
                }
            }
        }
        Ok(())
    }

    /// Formats the expression as canonical query text.
    ///
    /// Values are always double-quoted, and parentheses appear only where precedence or
    /// left-associativity needs them, so the output parses back to an equal tree:
    /// `title="a" + body="b" * issued="c"`.
    pub fn to_query_string(&self) -> String {
        let mut out = String::new();
        let mut pending = vec![Piece::Node(self, false)];
        while let Some(piece) = pending.pop() {
            let (node, grouped) = match piece {
                Piece::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                Piece::Node(node, grouped) => (node, grouped),
            };
            if grouped {
                out.push('(');
                pending.push(Piece::Text(")"));
            }
            match node {
                Self::Expression { term, value } => {
                    out.push_str(term.as_str());
                    out.push('=');
                    out.push_str(&quote_value(value));
                }
                Self::Or { left, right } => {
                    pending.push(Piece::Node(&**right, matches!(**right, Self::Or { .. })));
                    pending.push(Piece::Text(" + "));
                    pending.push(Piece::Node(&**left, false));
                }
                Self::And { left, right } => {
                    pending.push(Piece::Node(
                        &**right,
                        !matches!(**right, Self::Expression { .. }),
                    ));
                    pending.push(Piece::Text(" * "));
                    pending.push(Piece::Node(&**left, matches!(**left, Self::Or { .. })));
                }
            }
        }
        out
    }

    /// Moves any `And`/`Or` children onto `stack`, leaving empty leaves in their place.
    fn detach_children(&mut self, stack: &mut Vec<Self>) {
        if let Self::And { left, right } | Self::Or { left, right } = self {
            for child in [left, right] {
                if child.children().is_some() {
                    stack.push(mem::replace(&mut **child, Self::placeholder()));
                }
            }
        }
    }

    /// An allocation-free leaf used while tearing a tree down.
    fn placeholder() -> Self {
        Self::Expression {
            term: Term::Title,
            value: String::new(),
        }
    }
}

/// Work item for [`AstNode::to_query_string`].
enum Piece<'a> {
    /// A subtree, and whether it needs parentheses.
    Node(&'a AstNode, bool),
    /// Literal text.
    Text(&'static str),
}

// Iterative: a chain of n operators is n levels deep.
impl Drop for AstNode {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.detach_children(&mut stack);
        while let Some(mut node) = stack.pop() {
            node.detach_children(&mut stack);
        }
    }
}

/// Double-quotes a value, escaping `"` and `\`.
pub fn quote_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f)
    }
}
