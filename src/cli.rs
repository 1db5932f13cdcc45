//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Scoreboard - best solver action per test case
///
/// Reads solver runs from the result store, keeps the highest-scoring
/// action for every test-case hash whose name starts with the filter
/// prefix, and prints the winners as JSON followed by the total score.
///
/// Examples:
///   scoreboard
///   scoreboard --db runs/my_database.db
///   scoreboard --prefix Validator
///   scoreboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the SQLite result store
    ///
    /// Defaults to my_database.db in the current directory.
    #[arg(long, value_name = "FILE", env = "SCOREBOARD_DB")]
    pub db: Option<PathBuf>,

    /// Table holding the solver runs
    #[arg(long, value_name = "TABLE")]
    pub table: Option<String>,

    /// Case-sensitive prefix of the test-case name
    ///
    /// Defaults to "Standard".
    #[arg(long, value_name = "PREFIX", env = "SCOREBOARD_PREFIX")]
    pub prefix: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .scoreboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .scoreboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref db) = self.db {
            if db.as_os_str().is_empty() {
                return Err("Database path must not be empty".to_string());
            }
            if db.is_dir() {
                return Err(format!("Database path is a directory: {}", db.display()));
            }
        }

        if let Some(ref table) = self.table {
            if table.is_empty() {
                return Err("Table name must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            db: None,
            table: None,
            prefix: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["scoreboard"]).unwrap();
        assert!(args.table.is_none());
        assert!(!args.init_config);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_overrides() {
        let args = Args::try_parse_from([
            "scoreboard",
            "--db",
            "runs.db",
            "--table",
            "results",
            "--prefix",
            "Validator",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.db, Some(PathBuf::from("runs.db")));
        assert_eq!(args.table.as_deref(), Some("results"));
        assert_eq!(args.prefix.as_deref(), Some("Validator"));
        assert!(args.verbose);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_empty_paths() {
        let mut args = make_args();
        args.db = Some(PathBuf::new());
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.table = Some(String::new());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
