//! Configuration file support for nodeforge.
//!
//! nodeforge supports two configuration file locations:
//! - Global: `~/.nodeforge/config.toml` - User-wide defaults
//! - Project: `.nodeforge/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::native_crate::DEFAULT_ADDON_NAME;
use crate::util::fs::read_to_string;

/// Default location of the native crate inside a project.
pub const DEFAULT_CRATE_DIR: &str = "native";

/// nodeforge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Native crate layout
    #[serde(rename = "crate")]
    pub krate: CrateConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// rustup toolchain to build with (e.g. "stable", "nightly", "1.80.0")
    pub toolchain: Option<String>,

    /// Build in release mode by default
    pub release: Option<bool>,

    /// Extra arguments always passed to `cargo build`
    pub cargo_args: Vec<String>,
}

/// Where the native crate and its addon live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrateConfig {
    /// Crate directory relative to the project root
    pub path: Option<PathBuf>,

    /// File name of the addon the host runtime loads
    pub addon: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.toolchain.is_some() {
            self.build.toolchain = other.build.toolchain;
        }
        if other.build.release.is_some() {
            self.build.release = other.build.release;
        }
        if !other.build.cargo_args.is_empty() {
            self.build.cargo_args = other.build.cargo_args;
        }

        if other.krate.path.is_some() {
            self.krate.path = other.krate.path;
        }
        if other.krate.addon.is_some() {
            self.krate.addon = other.krate.addon;
        }
    }

    /// Native crate directory relative to the project root.
    pub fn crate_dir(&self) -> &Path {
        self.krate
            .path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CRATE_DIR))
    }

    /// Addon file name.
    pub fn addon_name(&self) -> &str {
        self.krate.addon.as_deref().unwrap_or(DEFAULT_ADDON_NAME)
    }
}

/// Get the global nodeforge config directory (~/.nodeforge).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".nodeforge"))
}

/// Get the global config path (~/.nodeforge/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.nodeforge/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".nodeforge").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.nodeforge/config.toml)
/// 2. Global config (~/.nodeforge/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.build.toolchain.is_none());
        assert!(config.build.cargo_args.is_empty());
        assert_eq!(config.crate_dir(), Path::new("native"));
        assert_eq!(config.addon_name(), "index.node");
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[build]
toolchain = "nightly"
release = true
cargo_args = ["--features", "napi-8"]

[crate]
path = "crates/addon"
addon = "addon.node"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.toolchain.as_deref(), Some("nightly"));
        assert_eq!(config.build.release, Some(true));
        assert_eq!(config.build.cargo_args, vec!["--features", "napi-8"]);
        assert_eq!(config.crate_dir(), Path::new("crates/addon"));
        assert_eq!(config.addon_name(), "addon.node");
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.build.toolchain = Some("stable".to_string());
        base.krate.addon = Some("base.node".to_string());

        let mut override_cfg = Config::default();
        override_cfg.build.toolchain = Some("nightly".to_string());

        base.merge(override_cfg);

        assert_eq!(base.build.toolchain.as_deref(), Some("nightly"));
        assert_eq!(base.addon_name(), "base.node");
    }

    #[test]
    fn test_broken_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[build\ntoolchain = ").unwrap();

        let config = Config::load_or_default(&config_path);
        assert!(config.build.toolchain.is_none());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[build]
toolchain = "stable"
cargo_args = ["--locked"]
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[build]
toolchain = "1.80.0"

[crate]
path = "."
"#,
        )
        .unwrap();

        let config = load_config(Some(&global_path), &project_path);

        assert_eq!(config.build.toolchain.as_deref(), Some("1.80.0"));
        assert_eq!(config.build.cargo_args, vec!["--locked"]);
        assert_eq!(config.crate_dir(), Path::new("."));
    }
}
