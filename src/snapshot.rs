//! Snapshot text boundary: resolve pasted or stored schema snapshots into
//! a [`Schema`] before anything reaches the core.
//!
//! A snapshot is JSON in one of exactly two shapes: an object mapping
//! column name to type token, or a non-empty array of row objects that is
//! run through type inference. The shape is resolved once, here, into the
//! tagged [`ParsedSnapshot`] — downstream code never inspects raw JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;

use crate::infer;
use crate::schema::{LogicalType, Schema};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot structure: {0}")]
    UnsupportedShape(String),
}

/// A validated snapshot: either an explicit column-to-type map or raw rows
/// awaiting inference.
#[derive(Debug, Clone)]
pub enum ParsedSnapshot {
    ColumnTypes(Schema),
    Rows(Vec<serde_json::Map<String, Value>>),
}

impl ParsedSnapshot {
    pub fn into_schema(self) -> Schema {
        match self {
            ParsedSnapshot::ColumnTypes(schema) => schema,
            ParsedSnapshot::Rows(rows) => infer::infer_from_rows(&rows),
        }
    }
}

/// Parses snapshot text. An object must map every column to a string type
/// token; an array must be non-empty with object elements. Any other JSON
/// shape is rejected.
pub fn parse_snapshot(text: &str) -> Result<ParsedSnapshot, SnapshotError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Object(map) => {
            let mut schema = Schema::new();
            for (column, token) in map {
                let Value::String(token) = token else {
                    return Err(SnapshotError::UnsupportedShape(format!(
                        "column '{column}' must map to a type name string"
                    )));
                };
                schema.insert(&column, LogicalType::from_token(&token));
            }
            Ok(ParsedSnapshot::ColumnTypes(schema))
        }
        Value::Array(items) => {
            if items.is_empty() {
                return Err(SnapshotError::UnsupportedShape(
                    "row array must contain at least one row object".to_string(),
                ));
            }
            let rows = items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    other => Err(SnapshotError::UnsupportedShape(format!(
                        "row array elements must be objects, found {}",
                        json_kind(&other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParsedSnapshot::Rows(rows))
        }
        other => Err(SnapshotError::UnsupportedShape(format!(
            "expected an object of column types or an array of rows, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Resolves a schema input file by extension: `.csv`/`.tsv` are inferred
/// from the data, anything else is parsed as snapshot JSON.
pub fn schema_from_path(path: &Path, sample_rows: usize, delimiter: Option<u8>) -> Result<Schema> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => infer::infer_from_csv(path, sample_rows, delimiter.unwrap_or(b',')),
        Some("tsv") => infer::infer_from_csv(path, sample_rows, delimiter.unwrap_or(b'\t')),
        _ => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Reading snapshot file {path:?}"))?;
            let snapshot = parse_snapshot(&text)
                .with_context(|| format!("Parsing snapshot file {path:?}"))?;
            Ok(snapshot.into_schema())
        }
    }
}
