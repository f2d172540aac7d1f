//! Implementation of `sift config`.

use std::process::ExitCode;

use sift_highlight::{Highlighter, dim, warning};

use crate::cli::context::CommandContext;

/// Shows effective configuration settings and any validation warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;

    if config.sources.is_empty() {
        println!("{}", ctx.paint(dim, "# no config files found, using defaults"));
    }
    for source in &config.sources {
        println!(
            "{}",
            ctx.paint(dim, &format!("# from {}", source.display()))
        );
    }
    if let Some(root) = &config.config_root {
        println!(
            "{}",
            ctx.paint(dim, &format!("# root: {}", root.display()))
        );
    }

    let toml = config.settings_to_toml();
    if ctx.color {
        print!("{}", Highlighter::new().highlight_toml(&toml));
    } else {
        print!("{toml}");
    }

    for w in config.validate() {
        eprintln!("{} {w}", ctx.paint(warning, "warning:"));
    }

    ExitCode::SUCCESS
}
