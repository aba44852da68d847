//! Explanation delegation: build structured prompts over a schema pair and
//! forward them to the configured text-generation capability.
//!
//! Two contracts hold for every function here: the returned value is always
//! displayable text (generator failures are folded into the text, never
//! re-raised), and a pair of identical schemas short-circuits to a fixed
//! deterministic message without invoking the capability at all.

use log::warn;

use crate::diff::SchemaDiff;
use crate::llm::TextGenerator;
use crate::schema::Schema;

/// Explains the changes between two schemas for `table_name`.
///
/// When the diff is empty this returns a fixed message and never touches
/// `generator`. Otherwise the generator's output is returned verbatim; a
/// generator failure is reported as text.
pub fn explain(
    generator: &dyn TextGenerator,
    existing: &Schema,
    candidate: &Schema,
    table_name: &str,
) -> String {
    let diff = SchemaDiff::between(existing, candidate);
    if diff.is_empty() {
        return no_changes_message(table_name);
    }

    let prompt = build_prompt(existing, candidate, table_name);
    match generator.generate(&prompt) {
        Ok(text) => text,
        Err(err) => {
            warn!("Text generation failed for table '{table_name}': {err}");
            failure_text(&err.to_string())
        }
    }
}

/// Answers a free-form question, optionally carrying the shell's last
/// analysis context. Same always-displayable contract as [`explain`].
pub fn ask(generator: &dyn TextGenerator, question: &str, context: Option<&str>) -> String {
    let prompt = match context {
        Some(context) if !context.trim().is_empty() => format!(
            "You are an expert warehouse engineer helping with table schema evolution.\n\
             \n\
             Context from the most recent schema analysis:\n\
             {context}\n\
             \n\
             Question: {question}\n\
             Answer concisely."
        ),
        _ => format!(
            "You are an expert warehouse engineer helping with table schema evolution.\n\
             \n\
             Question: {question}\n\
             Answer concisely."
        ),
    };
    match generator.generate(&prompt) {
        Ok(text) => text,
        Err(err) => {
            warn!("Text generation failed for question: {err}");
            failure_text(&err.to_string())
        }
    }
}

/// The deterministic zero-diff message. Never produced by the generator.
pub fn no_changes_message(table_name: &str) -> String {
    format!(
        "No schema changes detected for table `{table_name}`.\n\
         Both existing and candidate schemas are identical.\n\
         No risks, conflicts, or SQL migrations are required."
    )
}

fn failure_text(reason: &str) -> String {
    format!("Explanation unavailable (text generation failed: {reason})")
}

/// The structured prompt: table coordinates, both schemas rendered in
/// sorted order, and four fixed instruction bullets.
pub fn build_prompt(existing: &Schema, candidate: &Schema, table_name: &str) -> String {
    format!(
        "You are an expert warehouse engineer. Compare the two table schemas and explain the changes clearly.\n\
         \n\
         Table: {table_name}\n\
         \n\
         Existing schema:\n\
         {}\n\
         \n\
         New schema (candidate):\n\
         {}\n\
         \n\
         Describe:\n\
         1) Added columns (with types)\n\
         2) Removed or missing columns and their impact\n\
         3) Data type conflicts and safe migration advice\n\
         4) Risks (NULLability, backfills, ingestion issues)\n\
         Keep it concise with bullet points.",
        existing.render(),
        candidate.render(),
    )
}
