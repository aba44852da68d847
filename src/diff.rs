//! Pure schema comparison: classify columns into added, removed, and
//! type-conflicted sets.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::schema::{LogicalType, Schema};

/// A column present in both schemas with differing types.
///
/// Type equality is exact token equality: a `NUMBER` -> `FLOAT` widening is
/// flagged exactly like an incompatible `TEXT` -> `NUMBER` change. No
/// compatibility lattice is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeConflict {
    pub existing: LogicalType,
    pub candidate: LogicalType,
}

/// Three-way classification of a schema pair.
///
/// The key-sets of the three maps are pairwise disjoint; columns present in
/// both schemas with equal types are unchanged and not materialized.
/// Swapping the operands swaps `added` and `removed` and flips each
/// conflict's sides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    pub added: BTreeMap<String, LogicalType>,
    pub removed: BTreeMap<String, LogicalType>,
    pub conflicted: BTreeMap<String, TypeConflict>,
}

impl SchemaDiff {
    /// Compares `existing` against `candidate`. Both inputs are already
    /// canonical (`Schema` upper-cases keys on insertion), so classification
    /// is plain key membership plus type equality.
    pub fn between(existing: &Schema, candidate: &Schema) -> Self {
        let mut diff = SchemaDiff::default();

        for (column, datatype) in candidate.iter() {
            match existing.get(column) {
                None => {
                    diff.added.insert(column.clone(), datatype.clone());
                }
                Some(previous) if previous != datatype => {
                    diff.conflicted.insert(
                        column.clone(),
                        TypeConflict {
                            existing: previous.clone(),
                            candidate: datatype.clone(),
                        },
                    );
                }
                Some(_) => {}
            }
        }

        for (column, datatype) in existing.iter() {
            if !candidate.contains(column) {
                diff.removed.insert(column.clone(), datatype.clone());
            }
        }

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.conflicted.is_empty()
    }

    /// Cardinalities of the three categories. Derived from the diff exactly
    /// once so every downstream rendering reports the same numbers.
    pub fn counts(&self) -> ChangeCounts {
        ChangeCounts {
            added: self.added.len(),
            removed: self.removed.len(),
            conflicted: self.conflicted.len(),
        }
    }
}

/// Per-category change cardinalities for summary rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub removed: usize,
    pub conflicted: usize,
}

impl ChangeCounts {
    /// Labeled rows for chart/summary output, in fixed order.
    pub fn rows(&self) -> [(&'static str, usize); 3] {
        [
            ("New Columns", self.added),
            ("Missing Columns", self.removed),
            ("Conflicts", self.conflicted),
        ]
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.conflicted
    }
}
