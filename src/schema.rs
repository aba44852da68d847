//! Schema model: the canonical logical type vocabulary and the column map.
//!
//! A [`Schema`] is an ordered mapping from canonical (upper-cased) column
//! name to [`LogicalType`]. It is the single shape every schema source in
//! this crate produces — file inference, snapshot parsing, and live catalog
//! fetches — and the shape the differ and SQL synthesizer consume.
//!
//! Canonicalization rules:
//!
//! - Column names are upper-cased on insertion. Two distinct input names
//!   that fold to the same canonical name resolve last-write-wins; this is
//!   a documented limitation, not an error.
//! - Type tokens round-trip through their canonical upper-case spelling
//!   (`NUMBER`, `FLOAT`, `BOOLEAN`, `TIMESTAMP_NTZ`, `TEXT`). Tokens
//!   outside the fixed vocabulary are carried verbatim so live catalogs can
//!   report types this crate does not model.
//! - Iteration order is lexicographic by canonical name, which is the
//!   deterministic ordering used for SQL output and prompt rendering.

use std::{collections::BTreeMap, fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical logical column type.
///
/// The five named variants are the supported vocabulary; `Other` preserves
/// any further upper-cased token reported by a live catalog. Parsing
/// normalizes known tokens to their variant, so `Other` never aliases one
/// of the named types and equality stays exact token equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogicalType {
    Number,
    Float,
    Boolean,
    TimestampNtz,
    Text,
    Other(String),
}

impl LogicalType {
    /// Normalizes a type token: known tokens map to their variant, anything
    /// else is preserved verbatim (upper-cased) as `Other`.
    pub fn from_token(value: &str) -> Self {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "NUMBER" => LogicalType::Number,
            "FLOAT" => LogicalType::Float,
            "BOOLEAN" => LogicalType::Boolean,
            "TIMESTAMP_NTZ" => LogicalType::TimestampNtz,
            "TEXT" => LogicalType::Text,
            _ => LogicalType::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LogicalType::Number => "NUMBER",
            LogicalType::Float => "FLOAT",
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::TimestampNtz => "TIMESTAMP_NTZ",
            LogicalType::Text => "TEXT",
            LogicalType::Other(token) => token,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["NUMBER", "FLOAT", "BOOLEAN", "TIMESTAMP_NTZ", "TEXT"]
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogicalType {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(LogicalType::from_token(value))
    }
}

impl Serialize for LogicalType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogicalType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        Ok(LogicalType::from_token(&token))
    }
}

/// Ordered mapping from canonical column name to logical type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    columns: BTreeMap<String, LogicalType>,
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Keys are re-canonicalized so hand-edited snapshot files keep the
        // uppercase invariant.
        let columns = BTreeMap::<String, LogicalType>::deserialize(deserializer)?;
        Ok(columns.into_iter().collect())
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a column, upper-casing the name. Names that fold to an
    /// existing canonical name overwrite it (last-write-wins).
    pub fn insert(&mut self, name: &str, datatype: LogicalType) {
        self.columns.insert(name.to_ascii_uppercase(), datatype);
    }

    pub fn get(&self, name: &str) -> Option<&LogicalType> {
        self.columns.get(&name.to_ascii_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates columns in lexicographic name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &LogicalType)> {
        self.columns.iter()
    }

    /// Renders the schema as sorted `- NAME: TYPE` lines for prompts and
    /// reports. An empty schema renders as `(no columns)`.
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return "(no columns)".to_string();
        }
        let mut lines = Vec::with_capacity(self.columns.len());
        for (name, datatype) in &self.columns {
            lines.push(format!("- {name}: {datatype}"));
        }
        lines.join("\n")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing schema JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        let reader = BufReader::new(file);
        let schema = serde_json::from_reader(reader).context("Parsing schema JSON")?;
        Ok(schema)
    }
}

impl<S: AsRef<str>> FromIterator<(S, LogicalType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, LogicalType)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, datatype) in iter {
            schema.insert(name.as_ref(), datatype);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_type_parses_known_tokens_case_insensitively() {
        assert_eq!(
            "number".parse::<LogicalType>().unwrap(),
            LogicalType::Number
        );
        assert_eq!(
            " timestamp_ntz ".parse::<LogicalType>().unwrap(),
            LogicalType::TimestampNtz
        );
        assert_eq!("TEXT".parse::<LogicalType>().unwrap(), LogicalType::Text);
    }

    #[test]
    fn logical_type_preserves_unknown_tokens_uppercased() {
        let parsed: LogicalType = "Variant".parse().unwrap();
        assert_eq!(parsed, LogicalType::Other("VARIANT".to_string()));
        assert_eq!(parsed.as_str(), "VARIANT");
    }

    #[test]
    fn other_never_aliases_a_named_variant() {
        let parsed: LogicalType = "Number".parse().unwrap();
        assert_ne!(parsed, LogicalType::Other("NUMBER".to_string()));
        assert_eq!(parsed, LogicalType::Number);
    }

    #[test]
    fn insert_uppercases_and_last_write_wins() {
        let mut schema = Schema::new();
        schema.insert("amount", LogicalType::Number);
        schema.insert("AMOUNT", LogicalType::Float);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.get("Amount"), Some(&LogicalType::Float));
    }

    #[test]
    fn iteration_is_lexicographic() {
        let schema: Schema = [
            ("zeta", LogicalType::Text),
            ("alpha", LogicalType::Number),
            ("mid", LogicalType::Boolean),
        ]
        .into_iter()
        .collect();
        let names: Vec<&str> = schema.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["ALPHA", "MID", "ZETA"]);
    }

    #[test]
    fn render_sorts_and_handles_empty() {
        let schema: Schema = [("b", LogicalType::Float), ("a", LogicalType::Text)]
            .into_iter()
            .collect();
        assert_eq!(schema.render(), "- A: TEXT\n- B: FLOAT");
        assert_eq!(Schema::new().render(), "(no columns)");
    }

    #[test]
    fn serde_round_trips_through_token_map() {
        let schema: Schema = [
            ("id", LogicalType::Number),
            ("raw", LogicalType::Other("VARIANT".to_string())),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&schema).expect("serialize");
        assert_eq!(json, r#"{"ID":"NUMBER","RAW":"VARIANT"}"#);
        let parsed: Schema = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, schema);
    }

    #[test]
    fn deserialization_recanonicalizes_keys() {
        let parsed: Schema = serde_json::from_str(r#"{"id":"number"}"#).expect("deserialize");
        assert_eq!(parsed.get("ID"), Some(&LogicalType::Number));
    }
}
