//! Implementation of `sift parse`.

use std::process::ExitCode;

use sift_config::OutputFormat;
use sift_highlight::{Highlighter, render_tokens};
use sift_query::{AstNode, tokenize};

use super::shared::{compile, report};
use crate::cli::{args::ParseCommand, context::CommandContext};

/// Parses a query and prints the tree in the requested format.
pub fn run(ctx: &CommandContext, cmd: &ParseCommand) -> ExitCode {
    let ast = match compile(ctx, &cmd.query) {
        Ok(ast) => ast,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    let format = cmd
        .format
        .map_or(ctx.config.output.format, OutputFormat::from);

    match format {
        OutputFormat::Tree => {
            print!("{ast}");
            ExitCode::SUCCESS
        }
        OutputFormat::Json => print_json(ctx, &ast),
        OutputFormat::Query => {
            println!("{}", canonical_text(ctx, &ast));
            ExitCode::SUCCESS
        }
    }
}

/// Renders canonical query text, styled when color is on.
fn canonical_text(ctx: &CommandContext, ast: &AstNode) -> String {
    let text = ast.to_query_string();
    if !ctx.color {
        return text;
    }
    match tokenize(&text) {
        Ok(tokens) => render_tokens(&tokens, true),
        Err(_) => text,
    }
}

/// Prints the tree as JSON.
fn print_json(ctx: &CommandContext, ast: &AstNode) -> ExitCode {
    match serde_json::to_string_pretty(ast) {
        Ok(json) => {
            if ctx.color {
                println!("{}", Highlighter::new().highlight_json(&json));
            } else {
                println!("{json}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize syntax tree: {e}");
            ExitCode::FAILURE
        }
    }
}
