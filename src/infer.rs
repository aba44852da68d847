//! Type inference: derive a [`Schema`] from raw tabular data.
//!
//! Two sources feed the same decision procedure: delimited files (CSV/TSV,
//! sampled with a configurable row limit) and JSON row arrays (pasted
//! snapshots of raw rows). Per column, every non-empty value is tested
//! against the candidate types; a candidate survives only if all observed
//! values fit it. The surviving candidates decide with first-match-wins
//! precedence: integer -> NUMBER, float -> FLOAT, boolean -> BOOLEAN,
//! date/datetime -> TIMESTAMP_NTZ, anything else -> TEXT.
//!
//! A column with no observed non-empty values decides TEXT.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

use crate::schema::{LogicalType, Schema};

#[derive(Debug, Clone)]
struct TypeCandidate {
    possible_integer: bool,
    possible_float: bool,
    possible_boolean: bool,
    possible_timestamp: bool,
    observed: bool,
}

impl TypeCandidate {
    fn new() -> Self {
        Self {
            possible_integer: true,
            possible_float: true,
            possible_boolean: true,
            possible_timestamp: true,
            observed: false,
        }
    }

    fn narrow(&mut self, value: &str) {
        self.observed = true;
        if self.possible_integer && value.parse::<i64>().is_err() {
            self.possible_integer = false;
        }
        if self.possible_float && value.parse::<f64>().is_err() {
            self.possible_float = false;
        }
        if self.possible_boolean && !is_boolean_token(value) {
            self.possible_boolean = false;
        }
        if self.possible_timestamp && !is_temporal_token(value) {
            self.possible_timestamp = false;
        }
    }

    fn decide(&self) -> LogicalType {
        if !self.observed {
            return LogicalType::Text;
        }
        if self.possible_integer {
            LogicalType::Number
        } else if self.possible_float {
            LogicalType::Float
        } else if self.possible_boolean {
            LogicalType::Boolean
        } else if self.possible_timestamp {
            LogicalType::TimestampNtz
        } else {
            LogicalType::Text
        }
    }
}

fn is_boolean_token(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn is_temporal_token(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
}

/// Infers a schema from a delimited file, sampling up to `sample_rows`
/// records (0 means full scan). Column names come from the header row and
/// are upper-cased in the result. An empty file yields an empty schema.
pub fn infer_from_csv(path: &Path, sample_rows: usize, delimiter: u8) -> Result<Schema> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("Opening input file {path:?}"))?;
    let headers = reader.headers()?.clone();
    let mut candidates = vec![TypeCandidate::new(); headers.len()];

    let mut record = csv::ByteRecord::new();
    let mut processed = 0usize;
    while reader.read_byte_record(&mut record)? {
        if sample_rows > 0 && processed >= sample_rows {
            break;
        }
        for (idx, field) in record.iter().enumerate() {
            if field.is_empty() {
                continue;
            }
            let as_str = std::str::from_utf8(field)?;
            candidates[idx].narrow(as_str);
        }
        processed += 1;
    }

    Ok(headers
        .iter()
        .zip(candidates.iter())
        .map(|(header, candidate)| (header, candidate.decide()))
        .collect())
}

/// Infers a schema from JSON row objects. Native value kinds narrow the
/// candidates directly: integers are NUMBER-like, non-integral numbers
/// FLOAT-like, booleans BOOLEAN-like, and strings narrow by parsing the
/// same way file fields do. Null and missing cells are skipped.
pub fn infer_from_rows(rows: &[serde_json::Map<String, serde_json::Value>]) -> Schema {
    use serde_json::Value;

    let mut columns: Vec<String> = Vec::new();
    let mut candidates: Vec<TypeCandidate> = Vec::new();

    for row in rows {
        for (name, value) in row {
            let idx = match columns.iter().position(|col| col == name) {
                Some(idx) => idx,
                None => {
                    columns.push(name.clone());
                    candidates.push(TypeCandidate::new());
                    columns.len() - 1
                }
            };
            let candidate = &mut candidates[idx];
            match value {
                Value::Null => {}
                Value::Number(number) => {
                    if number.is_i64() || number.is_u64() {
                        candidate.narrow(&number.to_string());
                    } else {
                        candidate.observed = true;
                        candidate.possible_integer = false;
                        candidate.possible_boolean = false;
                        candidate.possible_timestamp = false;
                    }
                }
                Value::Bool(_) => {
                    candidate.observed = true;
                    candidate.possible_integer = false;
                    candidate.possible_float = false;
                    candidate.possible_timestamp = false;
                }
                Value::String(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    candidate.narrow(text);
                }
                Value::Array(_) | Value::Object(_) => {
                    candidate.observed = true;
                    candidate.possible_integer = false;
                    candidate.possible_float = false;
                    candidate.possible_boolean = false;
                    candidate.possible_timestamp = false;
                }
            }
        }
    }

    columns
        .iter()
        .zip(candidates.iter())
        .map(|(name, candidate)| (name, candidate.decide()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows_from(value: serde_json::Value) -> Vec<serde_json::Map<String, serde_json::Value>> {
        value
            .as_array()
            .expect("array")
            .iter()
            .map(|row| row.as_object().expect("object").clone())
            .collect()
    }

    #[test]
    fn integer_columns_decide_number() {
        let rows = rows_from(json!([{"id": 1}, {"id": 2}]));
        let schema = infer_from_rows(&rows);
        assert_eq!(schema.get("ID"), Some(&LogicalType::Number));
    }

    #[test]
    fn decimal_columns_decide_float() {
        let rows = rows_from(json!([{"amount": 1.5}, {"amount": 2.0}]));
        let schema = infer_from_rows(&rows);
        assert_eq!(schema.get("AMOUNT"), Some(&LogicalType::Float));
    }

    #[test]
    fn boolean_columns_decide_boolean() {
        let rows = rows_from(json!([{"active": true}, {"active": false}]));
        let schema = infer_from_rows(&rows);
        assert_eq!(schema.get("ACTIVE"), Some(&LogicalType::Boolean));
    }

    #[test]
    fn temporal_strings_decide_timestamp() {
        let rows = rows_from(json!([
            {"hired": "2024-01-01"},
            {"hired": "2024-03-15 08:30:00"}
        ]));
        let schema = infer_from_rows(&rows);
        assert_eq!(schema.get("HIRED"), Some(&LogicalType::TimestampNtz));
    }

    #[test]
    fn mixed_columns_fall_back_to_text() {
        let rows = rows_from(json!([{"v": 1}, {"v": "abc"}]));
        let schema = infer_from_rows(&rows);
        assert_eq!(schema.get("V"), Some(&LogicalType::Text));
    }

    #[test]
    fn integer_precedence_beats_boolean_and_float() {
        // "1"-style strings parse as integers, floats, and nothing else;
        // integer wins by precedence.
        let rows = rows_from(json!([{"flag": "1"}, {"flag": "0"}]));
        let schema = infer_from_rows(&rows);
        assert_eq!(schema.get("FLAG"), Some(&LogicalType::Number));
    }

    #[test]
    fn yes_no_strings_are_text_not_boolean() {
        let rows = rows_from(json!([{"flag": "yes"}, {"flag": "no"}]));
        let schema = infer_from_rows(&rows);
        assert_eq!(schema.get("FLAG"), Some(&LogicalType::Text));
    }

    #[test]
    fn all_null_column_decides_text() {
        let rows = rows_from(json!([{"gap": null}, {"gap": null}]));
        let schema = infer_from_rows(&rows);
        assert_eq!(schema.get("GAP"), Some(&LogicalType::Text));
    }

    #[test]
    fn column_names_are_uppercased() {
        let rows = rows_from(json!([{"first_name": "Ada"}]));
        let schema = infer_from_rows(&rows);
        assert!(schema.contains("FIRST_NAME"));
        assert_eq!(schema.iter().next().unwrap().0, "FIRST_NAME");
    }

    #[test]
    fn empty_input_yields_empty_schema() {
        let schema = infer_from_rows(&[]);
        assert!(schema.is_empty());
    }
}
