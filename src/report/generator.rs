//! Report generation.
//!
//! The report is two blocks on stdout: the best action per key as an
//! indented JSON object, then the scaled total of the best scores.

use crate::analysis::BestPerKey;
use crate::error::{Result, ScoreboardError};
use crate::models::{float_repr, Action, Key};
use serde::ser::{Error as _, Serialize};
use serde_json::ser::Formatter;
use std::io::{self, Write};

/// Label preceding the total on the summary line.
pub const TOTAL_LABEL: &str = "total score: ";

/// Rendering options for the JSON block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Escape every non-ASCII character as `\uXXXX`.
    pub ensure_ascii: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            ensure_ascii: true,
        }
    }
}

impl From<&crate::config::ReportConfig> for ReportOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            indent: config.indent,
            ensure_ascii: config.ensure_ascii,
        }
    }
}

/// String formatter with optional ASCII-only output.
struct ReportFormatter {
    ensure_ascii: bool,
}

impl Formatter for ReportFormatter {
    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        if !self.ensure_ascii || fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

fn serialization_error(msg: String) -> ScoreboardError {
    ScoreboardError::Serialization(serde_json::Error::custom(msg))
}

/// Quote and escape `s` as a JSON string.
fn json_string(s: &str, ensure_ascii: bool) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, ReportFormatter { ensure_ascii });
    s.serialize(&mut serializer)?;

    let json =
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(json)
}

/// Float literal as the solver tooling writes it. Non-finite values use the
/// `Infinity`/`NaN` extension instead of degrading to `null`.
fn json_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        float_repr(x)
    }
}

fn json_key(key: &Key, ensure_ascii: bool) -> Result<String> {
    let text = match key {
        Key::Null => "null".to_string(),
        Key::Integer(n) => n.to_string(),
        Key::Real(x) => json_float(*x),
        Key::Text(s) => s.clone(),
        Key::Blob(bytes) => {
            return Err(serialization_error(format!(
                "keys must be text, integer, real or null, not a blob of {} bytes",
                bytes.len()
            )));
        }
    };
    json_string(&text, ensure_ascii)
}

fn json_value(action: &Action, ensure_ascii: bool) -> Result<String> {
    match action {
        Action::Null => Ok("null".to_string()),
        Action::Integer(n) => Ok(n.to_string()),
        Action::Real(x) => Ok(json_float(*x)),
        Action::Text(s) => json_string(s, ensure_ascii),
        Action::Blob(bytes) => Err(serialization_error(format!(
            "blob action of {} bytes is not JSON serializable",
            bytes.len()
        ))),
    }
}

/// Render the best action per key as an indented JSON object.
///
/// Keys are written as strings, so an integer and a text key with the same
/// digits both appear. Fails if a kept key or action has no JSON form (a
/// blob).
pub fn generate_actions_json(best: &BestPerKey, options: &ReportOptions) -> Result<String> {
    if best.is_empty() {
        return Ok("{}".to_string());
    }

    let indent = " ".repeat(options.indent);
    let mut json = String::from("{");
    for (i, (key, action)) in best.actions().enumerate() {
        if i > 0 {
            json.push(',');
        }
        json.push('\n');
        json.push_str(&indent);
        json.push_str(&json_key(key, options.ensure_ascii)?);
        json.push_str(": ");
        json.push_str(&json_value(action, options.ensure_ascii)?);
    }
    json.push_str("\n}");
    Ok(json)
}

/// Render the summary line.
pub fn generate_total_line(best: &BestPerKey) -> String {
    format!("{}{}", TOTAL_LABEL, best.scaled_total())
}

/// Write the full report.
///
/// The JSON block is rendered completely before anything is written, so a
/// serialization failure leaves `out` untouched.
pub fn write_report<W: Write>(
    out: &mut W,
    best: &BestPerKey,
    options: &ReportOptions,
) -> Result<()> {
    let json = generate_actions_json(best, options)?;
    writeln!(out, "{}", json)?;
    writeln!(out, "{}", generate_total_line(best))?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate;
    use crate::error::ScoreboardError;
    use crate::models::{Action, Key, Row, Score};

    fn report_for(rows: Vec<Row>) -> String {
        let (best, _) = aggregate(rows);
        let mut out = Vec::new();
        write_report(&mut out, &best, &ReportOptions::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn row(key: &str, action: &str, score: i64) -> Row {
        Row::new(key, action, Score::Integer(score))
    }

    #[test]
    fn test_single_key_report() {
        let output = report_for(vec![row("a", "actA", 10), row("a", "actB", 5)]);
        assert_eq!(output, "{\n    \"a\": \"actA\"\n}\ntotal score: 20\n");
    }

    #[test]
    fn test_tie_report() {
        let output = report_for(vec![row("a", "actA", 10), row("a", "actB", 10)]);
        assert_eq!(output, "{\n    \"a\": \"actA\"\n}\ntotal score: 20\n");
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(report_for(vec![row("a", "actA", -5)]), "{}\ntotal score: 0\n");
        assert_eq!(report_for(Vec::new()), "{}\ntotal score: 0\n");
    }

    #[test]
    fn test_two_key_report() {
        let output = report_for(vec![row("a", "actA", 3), row("b", "actB", 7)]);
        assert_eq!(
            output,
            "{\n    \"a\": \"actA\",\n    \"b\": \"actB\"\n}\ntotal score: 20\n"
        );
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let (best, _) = aggregate(vec![row("clé", "→ 😀", 1)]);

        let json = generate_actions_json(&best, &ReportOptions::default()).unwrap();
        assert_eq!(json, "{\n    \"cl\\u00e9\": \"\\u2192 \\ud83d\\ude00\"\n}");

        let raw = ReportOptions {
            ensure_ascii: false,
            ..ReportOptions::default()
        };
        let json = generate_actions_json(&best, &raw).unwrap();
        assert_eq!(json, "{\n    \"clé\": \"→ 😀\"\n}");
    }

    #[test]
    fn test_custom_indent() {
        let (best, _) = aggregate(vec![row("a", "x", 1)]);
        let options = ReportOptions {
            indent: 2,
            ..ReportOptions::default()
        };

        let json = generate_actions_json(&best, &options).unwrap();
        assert_eq!(json, "{\n  \"a\": \"x\"\n}");
    }

    #[test]
    fn test_non_text_actions() {
        let (best, _) = aggregate(vec![
            Row::new("a", Action::Null, Score::Integer(1)),
            Row::new("b", Action::Integer(5), Score::Integer(1)),
        ]);

        let json = generate_actions_json(&best, &ReportOptions::default()).unwrap();
        assert_eq!(json, "{\n    \"a\": null,\n    \"b\": 5\n}");
    }

    #[test]
    fn test_blob_action_fails_without_output() {
        let (best, _) = aggregate(vec![Row::new(
            "a",
            Action::Blob(vec![0, 1]),
            Score::Integer(1),
        )]);

        let mut out = Vec::new();
        let err = write_report(&mut out, &best, &ReportOptions::default()).unwrap_err();
        assert!(matches!(err, ScoreboardError::Serialization(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_losing_blob_action_is_harmless() {
        let output = report_for(vec![
            row("a", "actA", 10),
            Row::new("a", Action::Blob(vec![0xff]), Score::Integer(3)),
        ]);
        assert_eq!(output, "{\n    \"a\": \"actA\"\n}\ntotal score: 20\n");
    }

    #[test]
    fn test_real_actions_match_float_repr() {
        let (best, _) = aggregate(vec![
            Row::new("a", Action::Real(1.0), Score::Integer(1)),
            Row::new("b", Action::Real(1e16), Score::Integer(1)),
            Row::new("c", Action::Real(1.5e-5), Score::Integer(1)),
            Row::new("d", Action::Real(f64::INFINITY), Score::Integer(1)),
            Row::new("e", Action::Real(f64::NEG_INFINITY), Score::Integer(1)),
        ]);

        let json = generate_actions_json(&best, &ReportOptions::default()).unwrap();
        assert_eq!(
            json,
            "{\n    \"a\": 1.0,\n    \"b\": 1e+16,\n    \"c\": 1.5e-05,\n    \
             \"d\": Infinity,\n    \"e\": -Infinity\n}"
        );
    }

    #[test]
    fn test_typed_keys_render_as_strings() {
        let (best, _) = aggregate(vec![
            Row::new(Key::Integer(1), "int-key", Score::Integer(10)),
            Row::new(Key::from("1"), "text-key", Score::Integer(7)),
            Row::new(Key::Integer(2), "int-two", Score::Integer(3)),
            Row::new(Key::Real(2.0), "real-two", Score::Integer(5)),
            Row::new(Key::Real(0.5), "half", Score::Integer(1)),
            Row::new(Key::Null, "none", Score::Integer(1)),
        ]);

        let mut out = Vec::new();
        write_report(&mut out, &best, &ReportOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n    \"1\": \"int-key\",\n    \"1\": \"text-key\",\n    \
             \"2\": \"real-two\",\n    \"0.5\": \"half\",\n    \"null\": \"none\"\n}\n\
             total score: 48\n"
        );
    }

    #[test]
    fn test_winning_blob_key_fails_without_output() {
        let (best, _) = aggregate(vec![
            row("a", "actA", 1),
            Row::new(Key::Blob(vec![0x00, 0xff]), "b", Score::Integer(4)),
        ]);

        let mut out = Vec::new();
        let err = write_report(&mut out, &best, &ReportOptions::default()).unwrap_err();
        assert!(matches!(err, ScoreboardError::Serialization(_)));
        assert!(err.to_string().contains("blob of 2 bytes"));
        assert!(out.is_empty());
    }
}
