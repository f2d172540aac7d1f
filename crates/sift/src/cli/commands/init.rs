//! Implementation of `sift init`.

use std::{fs, process::ExitCode};

use sift_config::{
    CONFIG_FILENAME, ConfigError, global_config_path, global_template, local_template,
};
use sift_highlight::{Highlighter, subheader};
use tracing::debug;

use crate::cli::{args::InitCommand, context::CommandContext};

/// Initializes a `.sift.toml` configuration file.
pub fn run(ctx: &CommandContext, cmd: &InitCommand) -> ExitCode {
    let cwd = &ctx.cwd;

    // Running in the home directory creates the global file
    let is_home_dir = global_config_path()
        .and_then(|p| p.parent().map(|h| h == cwd))
        .unwrap_or(false);

    let use_global = cmd.global || is_home_dir;

    let config_path = if use_global {
        match global_config_path().ok_or(ConfigError::NoHomeDirectory) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        cwd.join(CONFIG_FILENAME)
    };

    if config_path.exists() && !cmd.force {
        eprintln!(
            "error: configuration file already exists: {}",
            config_path.display()
        );
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    let template = if use_global {
        global_template()
    } else {
        local_template()
    };

    if let Err(e) = fs::write(&config_path, &template) {
        eprintln!("error: failed to write {}: {e}", config_path.display());
        return ExitCode::FAILURE;
    }
    debug!(path = %config_path.display(), global = use_global, "wrote config template");

    println!("Created {}", config_path.display());

    if ctx.color {
        println!();
        println!("{}", subheader("Configuration written:"));
        print!("{}", Highlighter::new().highlight_toml(&template));
    }

    ExitCode::SUCCESS
}
