//! Deterministic SQL migration synthesis from a schema diff.
//!
//! The statement sequence is reproducible for identical inputs: categories
//! render in fixed order (added, removed advisories, conflicts) and columns
//! render lexicographically within each category. Removed columns only ever
//! produce advisory comments; a `DROP COLUMN` is never generated because
//! destructive schema changes must stay a human decision.

use itertools::Itertools;

use crate::diff::SchemaDiff;
use crate::schema::Schema;

pub const NO_CHANGES_SQL: &str =
    "-- No schema changes detected. No ALTER TABLE statements are required.";

/// Renders the migration SQL for moving `table_name` from `existing` to
/// `candidate`. Always returns non-empty, renderable text.
pub fn synthesize(existing: &Schema, candidate: &Schema, table_name: &str) -> String {
    let diff = SchemaDiff::between(existing, candidate);
    let statements = statements(&diff, table_name);
    if statements.is_empty() {
        return NO_CHANGES_SQL.to_string();
    }
    statements.iter().join("\n")
}

/// The ordered statement sequence for a precomputed diff. Empty when the
/// diff is empty; callers wanting displayable text use [`synthesize`].
pub fn statements(diff: &SchemaDiff, table_name: &str) -> Vec<String> {
    let mut statements = Vec::with_capacity(diff.counts().total());

    for (column, datatype) in &diff.added {
        statements.push(format!(
            "ALTER TABLE {table_name} ADD COLUMN {column} {datatype} NULL;"
        ));
    }

    for (column, datatype) in &diff.removed {
        statements.push(format!(
            "-- NOTE: Column {column} ({datatype}) exists in the current schema but not in the candidate. Drop it manually only if intentional."
        ));
    }

    for (column, conflict) in &diff.conflicted {
        statements.push(format!(
            "ALTER TABLE {table_name} ALTER COLUMN {column} SET DATA TYPE {};",
            conflict.candidate
        ));
    }

    statements
}
