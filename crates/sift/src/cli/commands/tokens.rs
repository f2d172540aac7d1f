//! Implementation of `sift tokens`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use sift_highlight::Highlighter;
use sift_query::Token;

use super::shared::{lex, report};
use crate::cli::{args::TokensCommand, context::CommandContext};

/// Prints the token stream for a query.
pub fn run(ctx: &CommandContext, cmd: &TokensCommand) -> ExitCode {
    let tokens = match lex(ctx, &cmd.query) {
        Ok(tokens) => tokens,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return print_json(ctx, &tokens);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["#", "Kind", "Value"]);
    for (idx, token) in tokens.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx),
            Cell::new(token.kind()),
            Cell::new(payload(token)),
        ]);
    }
    println!("{table}");

    ExitCode::SUCCESS
}

/// Returns the display text for a token's payload, empty for operators.
fn payload(token: &Token) -> String {
    match token {
        Token::Term(term) => term.to_string(),
        Token::String(value) => format!("{value:?}"),
        Token::Equal | Token::Or | Token::And | Token::LParen | Token::RParen => String::new(),
    }
}

/// Prints tokens as a JSON array.
fn print_json(ctx: &CommandContext, tokens: &[Token]) -> ExitCode {
    match serde_json::to_string_pretty(tokens) {
        Ok(json) => {
            if ctx.color {
                println!("{}", Highlighter::new().highlight_json(&json));
            } else {
                println!("{json}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize tokens: {e}");
            ExitCode::FAILURE
        }
    }
}
