//! Configuration system for sift.
//!
//! sift uses TOML configuration files named `.sift.toml`. Configuration is resolved by walking
//! up the directory tree from the current working directory, collecting any `.sift.toml` files
//! found, then loading `~/.sift.toml` as the global config with lowest precedence. A file with
//! `root = true` ends the walk and suppresses the global config.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    fmt,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawOutputSettings, RawQuerySettings, parse_config_file, parse_config_str,
};
use serde::{Deserialize, Serialize};
pub use templates::{global_template, local_template};
use tracing::debug;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Default maximum query length in bytes.
pub const DEFAULT_MAX_LENGTH: usize = 4096;

/// Default maximum parenthesis nesting depth.
///
/// Kept equal to `sift_query::DEFAULT_MAX_DEPTH`, so an unconfigured CLI accepts exactly
/// what the library's `parse` accepts.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Top-level merged configuration for sift.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.sift.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Query limits.
    pub query: QuerySettings,
    /// Output settings.
    pub output: OutputSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
    /// Files that contributed to this configuration, highest precedence first.
    pub sources: Vec<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.sift.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        debug!(cwd = %cwd.display(), files = ?config_files, "discovered config files");
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for limits of zero, which make every query (or every grouped query)
    /// fail.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output has the same shape as a `.sift.toml` file, without the `root` flag.
    pub fn settings_to_toml(&self) -> String {
        let serializable = SerializableSettings {
            query: &self.query,
            output: &self.output,
        };
        toml::to_string_pretty(&serializable)
            .unwrap_or_else(|e| format!("# failed to render settings: {e}\n"))
    }
}

/// Limits applied to incoming queries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Queries longer than this many bytes are rejected before lexing.
    pub max_length: usize,
    /// Maximum parenthesis nesting accepted by the parser.
    pub max_depth: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// How `sift parse` renders a parsed query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented tree, one node per line.
    #[default]
    Tree,
    /// JSON with a `type` tag on every node.
    Json,
    /// Canonical query text.
    Query,
}

impl OutputFormat {
    /// Returns the name used in configuration files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Json => "json",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Default format for `sift parse`.
    pub format: OutputFormat,
    /// Whether to style terminal output with ANSI colors.
    pub color: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
        }
    }
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Query limits.
    query: &'a QuerySettings,
    /// Output settings.
    output: &'a OutputSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_settings_defaults() {
        let query = QuerySettings::default();
        assert_eq!(query.max_length, 4096);
        assert_eq!(query.max_depth, 128);
    }

    #[test]
    fn test_output_settings_defaults() {
        let output = OutputSettings::default();
        assert_eq!(output.format, OutputFormat::Tree);
        assert!(output.color);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.config_root.is_none());
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_load_from_no_files() {
        let config = Config::load_from_files(&[]).unwrap();
        assert_eq!(config.query, QuerySettings::default());
    }

    #[test]
    fn test_settings_to_toml() {
        let config = Config::default();
        let toml = config.settings_to_toml();

        assert!(toml.contains("[query]"));
        assert!(toml.contains("[output]"));
        assert!(toml.contains("max_length = 4096"));
        assert!(toml.contains("max_depth = 128"));
        assert!(toml.contains("format = \"tree\""));
        assert!(toml.contains("color = true"));

        // Round-trips through the file parser
        let parsed = parse::parse_config(&toml).unwrap();
        assert_eq!(parsed.query.unwrap().max_depth, Some(128));
        assert_eq!(parsed.output.unwrap().format, Some(OutputFormat::Tree));
    }
}
