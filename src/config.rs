//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.scoreboard.toml` files. Every setting defaults to the fixed values the
//! solver tooling uses, so running without a config file needs no setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".scoreboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Result store settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Row filter settings.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Location of the solver results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the SQLite database.
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Table holding one row per solver run.
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            table: default_table(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(crate::store::DEFAULT_DB_PATH)
}

fn default_table() -> String {
    crate::store::DEFAULT_TABLE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Literal, case-sensitive prefix of the `name` column.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "Standard".to_string()
}

/// Report rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Spaces per JSON nesting level.
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Escape non-ASCII characters in the JSON block.
    #[serde(default = "default_true")]
    pub ensure_ascii: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            ensure_ascii: true,
        }
    }
}

fn default_indent() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from `dir/.scoreboard.toml`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Try to load configuration from the current directory.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref db) = args.db {
            self.source.path = db.clone();
        }
        if let Some(ref table) = args.table {
            self.source.table = table.clone();
        }
        if let Some(ref prefix) = args.prefix {
            self.filter.prefix = prefix.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        let config = Config::default();
        toml::to_string_pretty(&config).context("Failed to serialize default config")
    }
}
