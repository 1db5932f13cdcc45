//! Best-score-per-key reduction.
//!
//! Each key keeps the action of the first row whose score strictly exceeds
//! everything seen before for that key, starting from an implicit best of 0.
//! A key whose rows never score above 0 therefore never gets an entry.

use crate::error::Result;
use crate::models::{Action, Key, Row, ScanStats, Score, ScoreTotal};
use crate::store::ResultStore;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// Factor applied to the summed best scores in the report.
pub const TOTAL_SCALE: i64 = 2;

/// Winning row data for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Best {
    pub score: Score,
    pub action: Action,
}

/// Best score and best action per key, kept in lockstep.
///
/// Keys iterate in the order they first received an entry.
#[derive(Debug, Clone, Default)]
pub struct BestPerKey {
    entries: IndexMap<Key, Best>,
}

impl BestPerKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a row to the reduction. Returns `true` if it became the best
    /// for its key.
    pub fn offer(&mut self, row: Row) -> bool {
        let current = self
            .entries
            .get(&row.key)
            .map(|best| best.score)
            .unwrap_or(Score::ZERO);

        if !row.score.beats(&current) {
            return false;
        }

        // Replacing the value of an existing key keeps its position.
        self.entries.insert(
            row.key,
            Best {
                score: row.score,
                action: row.action,
            },
        );
        true
    }

    #[cfg(test)]
    pub fn get(&self, key: &Key) -> Option<&Best> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key → action view, in insertion order.
    pub fn actions(&self) -> impl Iterator<Item = (&Key, &Action)> {
        self.entries.iter().map(|(k, b)| (k, &b.action))
    }

    /// Sum of the best scores.
    pub fn total(&self) -> ScoreTotal {
        self.entries.values().map(|b| b.score).sum()
    }

    /// The figure printed on the summary line.
    pub fn scaled_total(&self) -> ScoreTotal {
        self.total().scaled(TOTAL_SCALE)
    }
}

/// Reduce rows, in the given order, into the best entry per key.
pub fn aggregate<I>(rows: I) -> (BestPerKey, ScanStats)
where
    I: IntoIterator<Item = Row>,
{
    let mut best = BestPerKey::new();
    let mut seen: HashSet<Key> = HashSet::new();
    let mut stats = ScanStats::default();

    for row in rows {
        stats.rows_scanned += 1;
        seen.insert(row.key.clone());

        let key = row.key.clone();
        let score = row.score;
        if best.offer(row) {
            stats.improvements += 1;
            debug!("New best for {}: {}", key, score);
        }
    }

    stats.keys_kept = best.len();
    stats.keys_without_positive = seen.len() - best.len();

    (best, stats)
}

/// Fetch the rows matching `prefix` from the store and reduce them.
pub fn collect_best(store: &ResultStore, prefix: &str) -> Result<(BestPerKey, ScanStats)> {
    let rows = store.fetch_matching(prefix)?;
    Ok(aggregate(rows))
}
