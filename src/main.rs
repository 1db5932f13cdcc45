//! Scoreboard - best solver action per test case
//!
//! Reads SameGame solver runs from the local result store, keeps the
//! highest-scoring action for each test-case hash whose name matches the
//! filter prefix, and prints the winners followed by the total score.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (store unavailable, schema mismatch, bad payload, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use report::ReportOptions;
use std::io;
use std::path::Path;
use store::ResultStore;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    init_logging(&args);

    info!("Scoreboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args) {
        error!("Report failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .scoreboard.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
    }

    let content = Config::default_toml()?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    eprintln!("Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging on stderr; stdout is reserved for the report.
///
/// `RUST_LOG` takes precedence over the verbosity flags when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Open the store, reduce the matching rows and print the report.
fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    info!(
        "Reading {} (table {}) for names starting with {:?}",
        config.source.path.display(),
        config.source.table,
        config.filter.prefix
    );

    // The connection lives only for this block and is closed on every path.
    let (best, stats) = {
        let store = ResultStore::open(&config.source.path, &config.source.table)?;
        analysis::collect_best(&store, &config.filter.prefix)
            .with_context(|| format!("Failed to read results from {}", store.path().display()))?
    };

    info!(
        "Scanned {} rows: {} keys kept, {} improvements",
        stats.rows_scanned, stats.keys_kept, stats.improvements
    );
    if best.is_empty() {
        info!("No positive scores for names starting with {:?}", config.filter.prefix);
    }
    if stats.keys_without_positive > 0 {
        warn!(
            "{} keys had no positive score and are omitted",
            stats.keys_without_positive
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_report(&mut out, &best, &ReportOptions::from(&config.report))?;

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
