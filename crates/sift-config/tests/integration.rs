//! Integration tests for sift-config.
//!
//! Tests the full configuration loading pipeline: discovery -> parse -> merge -> validate.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use sift_config::{
    CONFIG_FILENAME, Config, ConfigError, ConfigWarning, OutputFormat, is_global_config,
};

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory and returns its path.
    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Writes a `.sift.toml` in the given directory (relative to the root).
    fn write_config(&self, rel_dir: &str, content: &str) -> PathBuf {
        let dir = self.create_dir(rel_dir);
        let path = dir.join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_load_no_config_returns_defaults() {
    let env = TestEnv::new();
    // Isolate from any real ~/.sift.toml
    env.write_config("", "root = true\n");

    let config = Config::load(env.path()).unwrap();

    assert_eq!(config.query.max_length, 4096);
    assert_eq!(config.query.max_depth, 128);
    assert_eq!(config.output.format, OutputFormat::Tree);
    assert!(config.output.color);
    assert_eq!(config.config_root.as_deref(), Some(env.path()));
}

#[test]
fn test_nested_configs_merge_by_precedence() {
    let env = TestEnv::new();
    env.write_config(
        "",
        "root = true\n\n[query]\nmax_length = 512\nmax_depth = 32\n\n[output]\nformat = \"json\"\n",
    );
    let inner = env.write_config("project", "[query]\nmax_depth = 8\n");
    let cwd = env.create_dir("project/src");

    let config = Config::load(&cwd).unwrap();

    assert_eq!(config.query.max_depth, 8);
    assert_eq!(config.query.max_length, 512);
    assert_eq!(config.output.format, OutputFormat::Json);
    assert_eq!(config.sources.first(), Some(&inner));
    assert_eq!(config.config_root, Some(env.path().join("project")));
}

#[test]
fn test_root_config_hides_parents() {
    let env = TestEnv::new();
    env.write_config("", "[query]\nmax_length = 1\n");
    let root = env.write_config("project", "root = true\n");

    let config = Config::load(&env.path().join("project")).unwrap();

    assert_eq!(config.query.max_length, 4096);
    assert_eq!(config.sources, vec![root]);
}

#[test]
fn test_discovery_without_root_collects_parents() {
    let env = TestEnv::new();
    let outer = env.write_config("", "[output]\ncolor = false\n");
    let inner = env.write_config("a", "");

    let config = Config::load(&env.create_dir("a/b")).unwrap();
    let local: Vec<_> = config
        .sources
        .iter()
        .filter(|p| !is_global_config(p))
        .cloned()
        .collect();

    assert_eq!(local, vec![inner, outer]);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let env = TestEnv::new();
    env.write_config("", "root = true\n[query\n");

    let err = Config::load(env.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
    assert!(err.to_string().contains(CONFIG_FILENAME));
}

#[test]
fn test_wrong_value_type_is_an_error() {
    let env = TestEnv::new();
    env.write_config("", "root = true\n[query]\nmax_depth = \"deep\"\n");

    let err = Config::load(env.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
}

#[test]
fn test_missing_file_is_read_error() {
    let env = TestEnv::new();
    let missing = env.path().join("nope").join(CONFIG_FILENAME);

    let err = Config::load_from_files(&[missing]).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_zero_limits_produce_warnings() {
    let env = TestEnv::new();
    env.write_config("", "root = true\n[query]\nmax_length = 0\nmax_depth = 0\n");

    let config = Config::load(env.path()).unwrap();
    let warnings = config.validate();

    assert!(warnings.contains(&ConfigWarning::MaxLengthZero));
    assert!(warnings.contains(&ConfigWarning::MaxDepthZero));
}

#[test]
fn test_effective_settings_render_merged_values() {
    let env = TestEnv::new();
    env.write_config("", "root = true\n[output]\nformat = \"query\"\ncolor = false\n");

    let config = Config::load(env.path()).unwrap();
    let toml = config.settings_to_toml();

    assert!(toml.contains("format = \"query\""));
    assert!(toml.contains("color = false"));
    assert!(!toml.contains("root"));
}
