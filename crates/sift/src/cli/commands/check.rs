//! Implementation of `sift check`.

use std::process::ExitCode;

use sift_highlight::{dim, success};

use super::shared::{compile, report};
use crate::cli::{args::CheckCommand, context::CommandContext};

/// Validates each query, reporting every failure rather than stopping at the first.
pub fn run(ctx: &CommandContext, cmd: &CheckCommand) -> ExitCode {
    let mut failures = 0;

    for query in &cmd.queries {
        match compile(ctx, query) {
            Ok(ast) => {
                let detail = format!(
                    "({} expressions, depth {})",
                    ast.expression_count(),
                    ast.depth()
                );
                println!(
                    "{} {query} {}",
                    ctx.paint(success, "ok"),
                    ctx.paint(dim, &detail)
                );
            }
            Err(e) => {
                failures += 1;
                report(&e);
            }
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        if cmd.queries.len() > 1 {
            eprintln!("{failures} of {} queries invalid", cmd.queries.len());
        }
        ExitCode::FAILURE
    }
}
