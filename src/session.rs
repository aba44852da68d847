//! Shell-owned session state.
//!
//! The core is stateless; the one piece of cross-call state — the most
//! recent "schemas + SQL analyzed" context fed back into chat — is owned
//! here by the surrounding shell and overwritten on every analysis.

use crate::schema::Schema;

#[derive(Debug, Clone, Default)]
pub struct AnalysisState {
    pub previous: Option<Schema>,
    pub live: Option<Schema>,
    pub last_context: Option<String>,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one analysis, replacing any earlier context.
    pub fn record_analysis(&mut self, existing: &Schema, candidate: &Schema, sql: &str) {
        self.last_context = Some(render_context(existing, candidate, sql));
        self.previous = Some(existing.clone());
        self.live = Some(candidate.clone());
    }

    pub fn context(&self) -> Option<&str> {
        self.last_context.as_deref()
    }
}

/// The textual context handed to the chat capability as extra grounding.
pub fn render_context(existing: &Schema, candidate: &Schema, sql: &str) -> String {
    format!(
        "Existing schema:\n{}\nCandidate schema:\n{}\nGenerated SQL:\n{sql}",
        existing.render(),
        candidate.render(),
    )
}
