//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for settings that would make
//! every query fail.

use std::fmt;

use crate::Config;

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `query.max_length` is zero, so every query is rejected.
    MaxLengthZero,
    /// `query.max_depth` is zero, so no parenthesized group is accepted.
    MaxDepthZero,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxLengthZero => {
                write!(f, "query.max_length is 0: every query will be rejected")
            }
            Self::MaxDepthZero => {
                write!(
                    f,
                    "query.max_depth is 0: queries with parentheses will be rejected"
                )
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.query.max_length == 0 {
        warnings.push(ConfigWarning::MaxLengthZero);
    }
    if config.query.max_depth == 0 {
        warnings.push(ConfigWarning::MaxDepthZero);
    }

    warnings
}
