use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze table schema drift and synthesize migration SQL", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer a schema snapshot from a CSV/TSV or JSON row file
    Infer(InferArgs),
    /// Compare two schema inputs and report added/missing/conflicting columns
    Diff(DiffArgs),
    /// Synthesize migration SQL moving a table from one schema to another
    Sql(SqlArgs),
    /// Ask the configured language model to explain the schema changes
    Explain(ExplainArgs),
    /// Run the full analysis: diff, SQL, explanation, and change summary
    Analyze(AnalyzeArgs),
    /// Ask a free-form question, optionally grounded in a saved analysis context
    Ask(AskArgs),
}

#[derive(Debug, Args)]
pub struct InferArgs {
    /// Input file to inspect (.csv/.tsv is sampled, anything else is parsed as JSON rows)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination snapshot file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Number of rows to sample when inferring types (0 means full scan)
    #[arg(long, default_value_t = 2000)]
    pub sample_rows: usize,
    /// Delimiter character for delimited inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct SchemaPairArgs {
    /// Existing schema input (snapshot JSON, or .csv/.tsv to infer)
    #[arg(short = 'e', long = "existing")]
    pub existing: PathBuf,
    /// Candidate schema input (snapshot JSON, or .csv/.tsv to infer)
    #[arg(short = 'c', long = "candidate")]
    pub candidate: PathBuf,
    /// Number of rows to sample when inferring types from delimited inputs
    #[arg(long, default_value_t = 2000)]
    pub sample_rows: usize,
    /// Delimiter character for delimited inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub pair: SchemaPairArgs,
    /// Emit the classification as JSON instead of a text report
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SqlArgs {
    #[command(flatten)]
    pub pair: SchemaPairArgs,
    /// Target table name used in the generated statements
    #[arg(short = 't', long = "table")]
    pub table: String,
}

#[derive(Debug, Args)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub pair: SchemaPairArgs,
    /// Target table name referenced in the explanation
    #[arg(short = 't', long = "table")]
    pub table: String,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub pair: SchemaPairArgs,
    /// Target table name for SQL and explanation
    #[arg(short = 't', long = "table")]
    pub table: String,
    /// Skip the language-model explanation step
    #[arg(long = "no-explain")]
    pub no_explain: bool,
    /// Write the analysis context (schemas + SQL) to this file for later `ask` calls
    #[arg(long = "context-out")]
    pub context_out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,
    /// Context file produced by a previous `analyze --context-out`
    #[arg(long)]
    pub context: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
