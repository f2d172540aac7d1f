//! Query pipeline shared by the query commands, applying the configured limits.

use sift_query::{AstNode, QueryError, Token, parse_with_max_depth, tokenize};
use tracing::debug;

use crate::cli::context::CommandContext;

/// Rejects queries longer than the configured `max_length`.
fn check_length(ctx: &CommandContext, query: &str) -> Result<(), QueryError> {
    let limit = ctx.config.query.max_length;
    if query.len() > limit {
        return Err(QueryError::too_long(query.len(), limit));
    }
    Ok(())
}

/// Tokenizes a query after the length check.
pub fn lex(ctx: &CommandContext, query: &str) -> Result<Vec<Token>, QueryError> {
    check_length(ctx, query)?;
    tokenize(query).map_err(QueryError::from)
}

/// Tokenizes and parses a query with the configured nesting limit.
pub fn compile(ctx: &CommandContext, query: &str) -> Result<AstNode, QueryError> {
    let tokens = lex(ctx, query)?;
    let ast = parse_with_max_depth(tokens, ctx.config.query.max_depth)
        .map_err(|e| QueryError::from(e).with_query(query))?;
    debug!(
        expressions = ast.expression_count(),
        depth = ast.depth(),
        "compiled query"
    );
    Ok(ast)
}

/// Prints a query error to stderr.
pub fn report(err: &QueryError) {
    eprintln!("error: {err}");
}

#[cfg(test)]
mod tests {
    #[test]
    fn config_defaults_match_parser_defaults() {
        assert_eq!(
            sift_config::DEFAULT_MAX_DEPTH,
            sift_query::DEFAULT_MAX_DEPTH
        );
    }
}
