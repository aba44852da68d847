use std::collections::BTreeSet;

use proptest::prelude::*;
use schema_drift::diff::SchemaDiff;
use schema_drift::migrate;
use schema_drift::schema::{LogicalType, Schema};

fn logical_type() -> impl Strategy<Value = LogicalType> {
    prop_oneof![
        Just(LogicalType::Number),
        Just(LogicalType::Float),
        Just(LogicalType::Boolean),
        Just(LogicalType::TimestampNtz),
        Just(LogicalType::Text),
        Just(LogicalType::Other("VARIANT".to_string())),
    ]
}

fn schema() -> impl Strategy<Value = Schema> {
    prop::collection::btree_map("[A-H]", logical_type(), 0..8)
        .prop_map(|map| map.into_iter().collect())
}

fn key_set(schema: &Schema) -> BTreeSet<String> {
    schema.iter().map(|(name, _)| name.clone()).collect()
}

proptest! {
    #[test]
    fn self_diff_is_empty(a in schema()) {
        let diff = SchemaDiff::between(&a, &a);
        prop_assert!(diff.is_empty());
    }

    #[test]
    fn categories_are_disjoint_and_cover_both_key_sets(a in schema(), b in schema()) {
        let diff = SchemaDiff::between(&a, &b);

        let added: BTreeSet<_> = diff.added.keys().cloned().collect();
        let removed: BTreeSet<_> = diff.removed.keys().cloned().collect();
        let conflicted: BTreeSet<_> = diff.conflicted.keys().cloned().collect();

        prop_assert!(added.is_disjoint(&removed));
        prop_assert!(added.is_disjoint(&conflicted));
        prop_assert!(removed.is_disjoint(&conflicted));

        let unchanged: BTreeSet<String> = a
            .iter()
            .filter(|(name, datatype)| b.get(name) == Some(datatype))
            .map(|(name, _)| name.clone())
            .collect();

        let mut union = BTreeSet::new();
        union.extend(added);
        union.extend(removed);
        union.extend(conflicted);
        union.extend(unchanged);

        let mut all_keys = key_set(&a);
        all_keys.extend(key_set(&b));
        prop_assert_eq!(union, all_keys);
    }

    #[test]
    fn diff_is_antisymmetric_under_swap(a in schema(), b in schema()) {
        let forward = SchemaDiff::between(&a, &b);
        let backward = SchemaDiff::between(&b, &a);

        prop_assert_eq!(&forward.added, &backward.removed);
        prop_assert_eq!(&forward.removed, &backward.added);
        for (column, conflict) in &forward.conflicted {
            let flipped = backward.conflicted.get(column);
            prop_assert!(flipped.is_some());
            let flipped = flipped.unwrap();
            prop_assert_eq!(&conflict.existing, &flipped.candidate);
            prop_assert_eq!(&conflict.candidate, &flipped.existing);
        }
    }

    #[test]
    fn synthesized_sql_is_never_empty_and_never_destructive(a in schema(), b in schema()) {
        let sql = migrate::synthesize(&a, &b, "T");
        prop_assert!(!sql.is_empty());
        prop_assert!(!sql.contains("DROP COLUMN"));
        for line in sql.lines() {
            prop_assert!(line.ends_with(';') || line.starts_with("--"));
        }
    }

    #[test]
    fn synthesis_is_deterministic(a in schema(), b in schema()) {
        prop_assert_eq!(
            migrate::synthesize(&a, &b, "T"),
            migrate::synthesize(&a, &b, "T")
        );
    }
}
