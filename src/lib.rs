pub mod cli;
pub mod diff;
pub mod explain;
pub mod infer;
pub mod llm;
pub mod migrate;
pub mod schema;
pub mod session;
pub mod snapshot;
pub mod warehouse;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{AnalyzeArgs, AskArgs, Cli, Commands, DiffArgs, ExplainArgs, InferArgs, SqlArgs};
use crate::diff::SchemaDiff;
use crate::llm::LlmConfig;
use crate::schema::Schema;
use crate::session::AnalysisState;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("schema_drift", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Infer(args) => handle_infer(&args),
        Commands::Diff(args) => handle_diff(&args),
        Commands::Sql(args) => handle_sql(&args),
        Commands::Explain(args) => handle_explain(&args),
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Ask(args) => handle_ask(&args),
    }
}

fn load_pair(pair: &cli::SchemaPairArgs) -> Result<(Schema, Schema)> {
    let existing = snapshot::schema_from_path(&pair.existing, pair.sample_rows, pair.delimiter)
        .with_context(|| format!("Loading existing schema from {:?}", pair.existing))?;
    let candidate = snapshot::schema_from_path(&pair.candidate, pair.sample_rows, pair.delimiter)
        .with_context(|| format!("Loading candidate schema from {:?}", pair.candidate))?;
    Ok((existing, candidate))
}

fn handle_infer(args: &InferArgs) -> Result<()> {
    info!("Inferring schema from '{}'", args.input.display());
    let schema = snapshot::schema_from_path(&args.input, args.sample_rows, args.delimiter)
        .with_context(|| format!("Inferring schema from {:?}", args.input))?;
    match &args.output {
        Some(path) => {
            schema
                .save(path)
                .with_context(|| format!("Writing snapshot to {path:?}"))?;
            info!(
                "Inferred schema for {} column(s) written to {:?}",
                schema.len(),
                path
            );
        }
        None => {
            let json = serde_json::to_string_pretty(&schema).context("Rendering snapshot JSON")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn handle_diff(args: &DiffArgs) -> Result<()> {
    let (existing, candidate) = load_pair(&args.pair)?;
    let diff = SchemaDiff::between(&existing, &candidate);
    if args.json {
        let report = serde_json::json!({
            "added": diff.added,
            "removed": diff.removed,
            "conflicted": diff.conflicted,
            "counts": diff.counts(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_diff_report(&diff);
    Ok(())
}

fn print_diff_report(diff: &SchemaDiff) {
    println!("Added columns:");
    if diff.added.is_empty() {
        println!("  (none)");
    }
    for (column, datatype) in &diff.added {
        println!("  {column}: {datatype}");
    }
    println!("Missing columns:");
    if diff.removed.is_empty() {
        println!("  (none)");
    }
    for (column, datatype) in &diff.removed {
        println!("  {column}: {datatype}");
    }
    println!("Type conflicts:");
    if diff.conflicted.is_empty() {
        println!("  (none)");
    }
    for (column, conflict) in &diff.conflicted {
        println!(
            "  {column}: {} -> {}",
            conflict.existing, conflict.candidate
        );
    }
    println!("Change summary:");
    for (label, count) in diff.counts().rows() {
        println!("  {label}: {count}");
    }
}

fn handle_sql(args: &SqlArgs) -> Result<()> {
    let (existing, candidate) = load_pair(&args.pair)?;
    let sql = migrate::synthesize(&existing, &candidate, &args.table);
    println!("{sql}");
    Ok(())
}

fn handle_explain(args: &ExplainArgs) -> Result<()> {
    let (existing, candidate) = load_pair(&args.pair)?;
    let generator = LlmConfig::from_env()
        .context("Configuring the text-generation provider")?
        .into_generator();
    info!("Requesting explanation for table '{}'", args.table);
    let explanation = explain::explain(generator.as_ref(), &existing, &candidate, &args.table);
    println!("{explanation}");
    Ok(())
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let (existing, candidate) = load_pair(&args.pair)?;
    let diff = SchemaDiff::between(&existing, &candidate);
    let sql = migrate::synthesize(&existing, &candidate, &args.table);

    print_diff_report(&diff);
    println!();
    println!("Migration SQL:");
    println!("{sql}");

    if !args.no_explain {
        let generator = LlmConfig::from_env()
            .context("Configuring the text-generation provider")?
            .into_generator();
        info!("Requesting explanation for table '{}'", args.table);
        let explanation = explain::explain(generator.as_ref(), &existing, &candidate, &args.table);
        println!();
        println!("Explanation:");
        println!("{explanation}");
    }

    let mut state = AnalysisState::new();
    state.record_analysis(&existing, &candidate, &sql);
    if let Some(path) = &args.context_out {
        let context = state.context().unwrap_or_default();
        std::fs::write(path, context)
            .with_context(|| format!("Writing analysis context to {path:?}"))?;
        info!("Analysis context written to {:?}", path);
    }
    Ok(())
}

fn handle_ask(args: &AskArgs) -> Result<()> {
    let context = match &args.context {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Reading context file {path:?}"))?,
        ),
        None => None,
    };
    let generator = LlmConfig::from_env()
        .context("Configuring the text-generation provider")?
        .into_generator();
    let answer = explain::ask(generator.as_ref(), &args.question, context.as_deref());
    println!("{answer}");
    Ok(())
}
