//! Data models for the scoreboard.
//!
//! This module contains the value types read from the result store and
//! carried through the aggregation into the report.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier grouping candidate rows (the test-case hash).
///
/// Keys keep the storage class they were read with. `Integer(1)` and
/// `Text("1")` are different keys, while numerically equal integers and
/// reals (`2` and `2.0`) are the same key. Conversion to a JSON object key
/// happens only when the report is rendered.
#[derive(Debug, Clone)]
pub enum Key {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Kept so the row can take part in the reduction; rendering one fails.
    Blob(Vec<u8>),
}

impl Key {
    /// The integer this key is numerically equal to, if any.
    fn as_integral(&self) -> Option<i64> {
        match self {
            Key::Integer(n) => Some(*n),
            Key::Real(x) => {
                let n = exact_i64(*x)?;
                (n as f64 == *x).then_some(n)
            }
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Null, Key::Null) => true,
            (Key::Integer(a), Key::Integer(b)) => a == b,
            (Key::Real(a), Key::Real(b)) => a == b,
            (Key::Integer(n), Key::Real(x)) | (Key::Real(x), Key::Integer(n)) => {
                cmp_int_real(*n, *x) == Some(Ordering::Equal)
            }
            (Key::Text(a), Key::Text(b)) => a == b,
            (Key::Blob(a), Key::Blob(b)) => a == b,
            _ => false,
        }
    }
}

// SQLite turns NaN into NULL on storage, so a key never holds one.
impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(n) = self.as_integral() {
            0u8.hash(state);
            n.hash(state);
            return;
        }
        match self {
            Key::Null => 1u8.hash(state),
            Key::Real(x) => {
                2u8.hash(state);
                x.to_bits().hash(state);
            }
            Key::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Key::Blob(bytes) => {
                4u8.hash(state);
                bytes.hash(state);
            }
            Key::Integer(_) => {}
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => f.write_str("null"),
            Key::Integer(n) => write!(f, "{}", n),
            Key::Real(x) => f.write_str(&float_repr(*x)),
            Key::Text(s) => f.write_str(s),
            Key::Blob(bytes) => write!(f, "<blob of {} bytes>", bytes.len()),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Integer(n)
    }
}

/// Payload of a row, carried unchanged to the output.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Raw bytes. Stored as read; rendering one fails.
    Blob(Vec<u8>),
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Action::Text(s.to_string())
    }
}

/// `x` as an `i64` when its integer part fits, truncated toward zero.
fn exact_i64(x: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if x.is_finite() && (-LIMIT..LIMIT).contains(&x) {
        Some(x.trunc() as i64)
    } else {
        None
    }
}

/// Exact comparison of an integer with a real, without rounding the integer.
fn cmp_int_real(n: i64, x: f64) -> Option<Ordering> {
    if x.is_nan() {
        return None;
    }
    match exact_i64(x) {
        Some(whole) => match n.cmp(&whole) {
            Ordering::Equal => x.trunc().partial_cmp(&x),
            other => Some(other),
        },
        None if x > 0.0 => Some(Ordering::Less),
        None => Some(Ordering::Greater),
    }
}

/// Numeric fitness of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Integer(i64),
    Real(f64),
}

impl Score {
    /// Implicit best for a key that has not been seen yet.
    pub const ZERO: Score = Score::Integer(0);

    pub fn as_f64(&self) -> f64 {
        match self {
            Score::Integer(n) => *n as f64,
            Score::Real(x) => *x,
        }
    }

    /// Strict comparison used by the reduction; ties are not an improvement.
    pub fn beats(&self, other: &Score) -> bool {
        self.partial_cmp(other) == Some(Ordering::Greater)
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Score::Integer(a), Score::Integer(b)) => Some(a.cmp(b)),
            (Score::Integer(n), Score::Real(x)) => cmp_int_real(*n, *x),
            (Score::Real(x), Score::Integer(n)) => cmp_int_real(*n, *x).map(Ordering::reverse),
            (Score::Real(a), Score::Real(b)) => a.partial_cmp(b),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Integer(n) => write!(f, "{}", n),
            Score::Real(x) => f.write_str(&float_repr(*x)),
        }
    }
}

/// Sum of best scores. Stays integral until a real score is added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreTotal {
    Integer(i128),
    Real(f64),
}

impl Default for ScoreTotal {
    fn default() -> Self {
        ScoreTotal::Integer(0)
    }
}

impl ScoreTotal {
    pub fn add(self, score: Score) -> Self {
        match (self, score) {
            (ScoreTotal::Integer(acc), Score::Integer(n)) => ScoreTotal::Integer(acc + n as i128),
            (ScoreTotal::Integer(acc), Score::Real(x)) => ScoreTotal::Real(acc as f64 + x),
            (ScoreTotal::Real(acc), s) => ScoreTotal::Real(acc + s.as_f64()),
        }
    }

    pub fn scaled(self, factor: i64) -> Self {
        match self {
            ScoreTotal::Integer(n) => ScoreTotal::Integer(n * factor as i128),
            ScoreTotal::Real(x) => ScoreTotal::Real(x * factor as f64),
        }
    }
}

impl std::iter::Sum<Score> for ScoreTotal {
    fn sum<I: Iterator<Item = Score>>(iter: I) -> Self {
        iter.fold(ScoreTotal::default(), ScoreTotal::add)
    }
}

impl fmt::Display for ScoreTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreTotal::Integer(n) => write!(f, "{}", n),
            ScoreTotal::Real(x) => f.write_str(&float_repr(*x)),
        }
    }
}

/// Render a float the way the solver tooling prints them: shortest
/// round-trip digits, always with a fractional part or exponent.
pub fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = x.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        // `{:e}` yields e.g. "1.5e-5"; normalize to "1.5e-05".
        let s = format!("{:e}", x);
        let (mantissa, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(d) => ('-', d),
            None => ('+', exp),
        };
        return format!("{}e{}{:0>2}", mantissa, sign, digits);
    }

    let s = format!("{}", x);
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// One candidate row from the result store.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: Key,
    pub action: Action,
    pub score: Score,
}

impl Row {
    pub fn new(key: impl Into<Key>, action: impl Into<Action>, score: Score) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
            score,
        }
    }
}

/// Counters collected during a scan. Logged, never printed to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Rows consumed by the reduction.
    pub rows_scanned: usize,
    /// Rows that replaced the best entry for their key.
    pub improvements: usize,
    /// Keys present in the final mapping.
    pub keys_kept: usize,
    /// Keys seen only with non-positive scores.
    pub keys_without_positive: usize,
}
