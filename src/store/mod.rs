//! Read-only access to the solver result store.
//!
//! The store is a SQLite file written by the solver runs. Each record has a
//! test-case `name`, the test-case `hash`, the played `actions` and the
//! resulting `score`. This module only ever reads it.

use crate::error::{Result, ScoreboardError};
use crate::models::{Action, Key, Row, Score};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the result store.
pub const DEFAULT_DB_PATH: &str = "my_database.db";

/// Default table the solver writes into.
pub const DEFAULT_TABLE: &str = "my_objects";

/// A scoped, read-only connection to the result store.
///
/// The connection is closed when the store is dropped, on every exit path.
pub struct ResultStore {
    conn: Connection,
    path: PathBuf,
    table: String,
}

impl ResultStore {
    /// Open the store at `path`, reading from `table`.
    ///
    /// Fails if the file does not exist or is not a SQLite database.
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        if !is_identifier(table) {
            return Err(ScoreboardError::InvalidTable(table.to_string()));
        }

        let open_err = |source: rusqlite::Error| ScoreboardError::Open {
            path: path.to_path_buf(),
            source,
        };

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(open_err)?;

        // SQLite opens lazily; touch the header so corruption surfaces here.
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(open_err)?;

        debug!("Opened result store {} (table {})", path.display(), table);

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            table: table.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch `(hash, actions, score)` for every record whose name starts with
    /// `prefix`, in the order SQLite returns them.
    ///
    /// The match is literal and case-sensitive.
    pub fn fetch_matching(&self, prefix: &str) -> Result<Vec<Row>> {
        let sql = format!(
            "SELECT hash, actions, score FROM {} WHERE substr(name, 1, length(?1)) = ?1",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([prefix])?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let key = key_from_value(row.get_ref(0)?);
            let action = action_from_value(row.get_ref(1)?);
            let score = score_from_value(row.get_ref(2)?, &key)?;
            result.push(Row::new(key, action, score));
        }

        debug!("Fetched {} rows matching {:?}", result.len(), prefix);
        Ok(result)
    }
}

/// Whether `name` can be spliced into SQL as a bare identifier.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn key_from_value(value: ValueRef<'_>) -> Key {
    match value {
        ValueRef::Null => Key::Null,
        ValueRef::Integer(n) => Key::Integer(n),
        ValueRef::Real(x) => Key::Real(x),
        ValueRef::Text(bytes) => Key::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Key::Blob(bytes.to_vec()),
    }
}

fn action_from_value(value: ValueRef<'_>) -> Action {
    match value {
        ValueRef::Null => Action::Null,
        ValueRef::Integer(n) => Action::Integer(n),
        ValueRef::Real(x) => Action::Real(x),
        ValueRef::Text(bytes) => Action::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Action::Blob(bytes.to_vec()),
    }
}

fn score_from_value(value: ValueRef<'_>, key: &Key) -> Result<Score> {
    match value {
        ValueRef::Integer(n) => Ok(Score::Integer(n)),
        ValueRef::Real(x) => Ok(Score::Real(x)),
        _ => Err(ScoreboardError::InvalidScore {
            key: key.to_string(),
            found: describe(value),
        }),
    }
}

/// Short human-readable description of a column value for diagnostics.
fn describe(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "null".to_string(),
        ValueRef::Integer(n) => format!("integer {}", n),
        ValueRef::Real(x) => format!("real {}", x),
        ValueRef::Text(bytes) => format!("text {:?}", String::from_utf8_lossy(bytes)),
        ValueRef::Blob(b) => format!("blob ({} bytes)", b.len()),
    }
}
