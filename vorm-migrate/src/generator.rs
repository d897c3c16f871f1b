//! Migration procedure generation from change sets.

use serde::{Deserialize, Serialize};
use vorm_schema::SchemaField;

use crate::diff::ChangeSet;
use crate::operation::{IndexParams, Operation};

/// The upgrade and downgrade procedures of a migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOps {
    /// Operations applied by `migrate run`.
    pub upgrade: Vec<Operation>,
    /// Operations that undo `upgrade`.
    pub downgrade: Vec<Operation>,
}

impl MigrationOps {
    /// Check if both procedures are empty.
    pub fn is_empty(&self) -> bool {
        self.upgrade.is_empty() && self.downgrade.is_empty()
    }

    /// Append another entity's procedures.
    pub fn extend(&mut self, other: MigrationOps) {
        self.upgrade.extend(other.upgrade);
        self.downgrade.extend(other.downgrade);
    }
}

/// Generate the procedures for one entity's change set.
pub fn generate(changes: &ChangeSet) -> MigrationOps {
    let collection = changes.collection_name.as_str();

    if changes.initial {
        return initial(collection, &changes.added);
    }

    let mut ops = MigrationOps::default();

    for field in &changes.added {
        ops.upgrade.push(add_field(collection, field));
        ops.downgrade.push(drop_field(collection, field));
    }
    for field in &changes.removed {
        ops.upgrade.push(drop_field(collection, field));
        ops.downgrade.push(add_field(collection, field));
    }
    for change in &changes.modified {
        ops.upgrade.push(drop_field(collection, &change.old));
        ops.upgrade.push(add_field(collection, &change.new));
        ops.downgrade.push(drop_field(collection, &change.new));
        ops.downgrade.push(add_field(collection, &change.old));
    }

    ops
}

/// Generate one combined procedure pair for several entities.
pub fn generate_all<'a>(changes: impl IntoIterator<Item = &'a ChangeSet>) -> MigrationOps {
    let mut ops = MigrationOps::default();
    for change in changes {
        ops.extend(generate(change));
    }
    ops
}

fn initial(collection: &str, fields: &[SchemaField]) -> MigrationOps {
    let fields: Vec<SchemaField> = fields.iter().map(SchemaField::normalized).collect();

    let mut upgrade = vec![Operation::CreateCollection {
        collection: collection.to_string(),
        fields: fields.clone(),
    }];
    for field in fields.iter().filter(|f| f.data_type.is_vector()) {
        upgrade.push(Operation::CreateIndex {
            collection: collection.to_string(),
            field: field.name.clone(),
            params: IndexParams::default(),
        });
    }

    MigrationOps {
        upgrade,
        downgrade: vec![Operation::DropCollection {
            collection: collection.to_string(),
        }],
    }
}

fn add_field(collection: &str, field: &SchemaField) -> Operation {
    Operation::AddFields {
        collection: collection.to_string(),
        fields: vec![field.normalized()],
    }
}

fn drop_field(collection: &str, field: &SchemaField) -> Operation {
    Operation::DropFields {
        collection: collection.to_string(),
        fields: vec![field.name.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use pretty_assertions::assert_eq;
    use vorm_schema::{DataType, Schema};

    fn rule_v1() -> Schema {
        Schema::new(
            "Rule",
            "rules",
            vec![
                SchemaField::new("id", DataType::String).with_max_length(100).primary(),
                SchemaField::new("description", DataType::String).with_max_length(1000),
                SchemaField::new("embedding", DataType::FloatVector).with_dim(768),
            ],
        )
    }

    #[test]
    fn test_initial_creates_collection_and_indexes() {
        let ops = generate(&diff(None, &rule_v1()));
        assert_eq!(ops.upgrade.len(), 2);
        match &ops.upgrade[0] {
            Operation::CreateCollection { collection, fields } => {
                assert_eq!(collection, "rules");
                assert_eq!(fields.len(), 3);
            }
            other => panic!("unexpected operation: {other:?}"),
        }
        assert_eq!(
            ops.upgrade[1],
            Operation::CreateIndex {
                collection: "rules".to_string(),
                field: "embedding".to_string(),
                params: IndexParams::default(),
            }
        );
        assert_eq!(
            ops.downgrade,
            vec![Operation::DropCollection {
                collection: "rules".to_string()
            }]
        );
    }

    #[test]
    fn test_modification_is_drop_then_add() {
        let old = rule_v1();
        let mut new = rule_v1();
        new.fields[1] = SchemaField::new("description", DataType::String).with_max_length(2000);

        let ops = generate(&diff(Some(&old), &new));
        assert_eq!(ops.upgrade.len(), 2);
        assert_eq!(ops.upgrade[0].kind(), "drop_fields");
        match &ops.upgrade[1] {
            Operation::AddFields { fields, .. } => assert_eq!(fields[0].max_length, Some(2000)),
            other => panic!("unexpected operation: {other:?}"),
        }
        match &ops.downgrade[1] {
            Operation::AddFields { fields, .. } => assert_eq!(fields[0].max_length, Some(1000)),
            other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn test_add_and_remove_are_inverse() {
        let old = rule_v1();
        let mut new = rule_v1();
        new.fields.push(SchemaField::new("priority", DataType::Int64));

        let forward = generate(&diff(Some(&old), &new));
        let backward = generate(&diff(Some(&new), &old));
        assert_eq!(forward.upgrade, backward.downgrade);
        assert_eq!(forward.downgrade, backward.upgrade);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let old = rule_v1();
        let mut new = rule_v1();
        new.fields.remove(1);
        new.fields.push(SchemaField::new("priority", DataType::Int64));
        let changes = diff(Some(&old), &new);

        let a = serde_json::to_string(&generate(&changes)).unwrap();
        let b = serde_json::to_string(&generate(&changes)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_all_concatenates() {
        let rule = diff(None, &rule_v1());
        let violation = diff(
            None,
            &Schema::new(
                "Violation",
                "violations",
                vec![SchemaField::new("id", DataType::Int64).primary()],
            ),
        );
        let ops = generate_all([&rule, &violation]);
        let collections: Vec<_> = ops.upgrade.iter().map(Operation::collection).collect();
        assert_eq!(collections, vec!["rules", "rules", "violations"]);
        assert_eq!(ops.downgrade.len(), 2);
    }
}
