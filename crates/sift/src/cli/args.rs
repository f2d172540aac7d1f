//! Clap argument definitions for the `sift` CLI.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use sift_config::OutputFormat;

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Tokenize, parse and validate boolean search expressions")]
pub struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format choices for `sift parse`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// Indented tree, one node per line
    Tree,
    /// JSON with a `type` tag on every node
    Json,
    /// Canonical query text
    Query,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tree => Self::Tree,
            FormatArg::Json => Self::Json,
            FormatArg::Query => Self::Query,
        }
    }
}

/// Arguments for `sift tokens`.
#[derive(Args, Debug, Clone)]
pub struct TokensCommand {
    /// Query to tokenize
    pub query: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `sift parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query to parse
    pub query: String,

    /// Output format [default: from config, else tree]
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Arguments for `sift check`.
#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
    /// Queries to validate
    #[arg(required = true)]
    pub queries: Vec<String>,
}

/// Arguments for `sift init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.sift.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show the token stream for a query
    Tokens(TokensCommand),

    /// Parse a query and print its syntax tree
    #[command(after_help = "\
QUERY SYNTAX:
  title=rust               Keyword/value pair (keywords: title, body, issued)
  body=\"error handling\"    Quoted value; operators inside quotes are text
  title=a\\+b               \\X is a literal X
  a * b                    Both must match (AND, binds tighter)
  a + b                    Either matches (OR)
  (a + b) * c              Grouping

EXAMPLES:
  sift parse 'title=rust * body=async'
  sift parse 'title=guide * (body=rust + body=golang)' --format json
  sift parse \"issued='>=2024-01-01' + title=release\" --format query")]
    Parse(ParseCommand),

    /// Validate one or more queries
    Check(CheckCommand),

    /// Initialize sift configuration in current directory
    Init(InitCommand),

    /// Show effective configuration settings
    Config,
}
