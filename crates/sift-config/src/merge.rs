//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying
//! precedence rules.

use std::path::PathBuf;

use crate::{
    Config, OutputSettings, QuerySettings,
    parse::{RawConfig, RawOutputSettings, RawQuerySettings},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config). Each field takes the value from the
/// highest-precedence file that sets it, falling back to the default.
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    let mut query = QuerySettings::default();
    let mut output = OutputSettings::default();

    // Lowest precedence first so closer files overwrite
    for parsed in configs.iter().rev() {
        if let Some(raw) = &parsed.config.query {
            apply_query_settings(&mut query, raw);
        }
        if let Some(raw) = &parsed.config.output {
            apply_output_settings(&mut output, raw);
        }
    }

    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(PathBuf::from);

    Config {
        query,
        output,
        config_root,
        sources: configs.iter().map(|c| c.path.clone()).collect(),
    }
}

/// Applies raw query settings to result, overwriting any present values.
fn apply_query_settings(result: &mut QuerySettings, raw: &RawQuerySettings) {
    if let Some(v) = raw.max_length {
        result.max_length = v;
    }
    if let Some(v) = raw.max_depth {
        result.max_depth = v;
    }
}

/// Applies raw output settings to result, overwriting any present values.
fn apply_output_settings(result: &mut OutputSettings, raw: &RawOutputSettings) {
    if let Some(v) = raw.format {
        result.format = v;
    }
    if let Some(v) = raw.color {
        result.color = v;
    }
}
