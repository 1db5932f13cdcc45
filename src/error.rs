//! Error types for the scoreboard.
//!
//! Every variant is fatal: the binary reports it and exits non-zero.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ScoreboardError>;

#[derive(Debug, Error)]
pub enum ScoreboardError {
    /// The result database could not be opened (missing, unreadable, corrupt).
    #[error("failed to open result store {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Preparing or stepping the query failed (schema mismatch, corruption).
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("invalid table name {0:?}: expected a plain SQL identifier")]
    InvalidTable(String),

    /// The score column holds a non-numeric value.
    #[error("non-numeric score for key {key}: {found}")]
    InvalidScore { key: String, found: String },

    /// The report could not be rendered, e.g. a blob key or action won an entry.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
