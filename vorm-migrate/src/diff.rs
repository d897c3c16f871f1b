//! Schema diffing for generating migrations.

use std::collections::HashMap;

use tracing::debug;
use vorm_schema::{Schema, SchemaField};

/// A field whose definition changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// The last known definition.
    pub old: SchemaField,
    /// The candidate definition.
    pub new: SchemaField,
}

/// The difference between the last known schema of an entity and its candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Stable entity name.
    pub entity_name: String,
    /// Collection the changes apply to.
    pub collection_name: String,
    /// Fields present only in the candidate, in candidate order.
    pub added: Vec<SchemaField>,
    /// Fields present only in the last known schema, in its order.
    pub removed: Vec<SchemaField>,
    /// Fields present in both with different definitions, in last known order.
    pub modified: Vec<FieldChange>,
    /// True when no schema had ever been persisted for this entity.
    pub initial: bool,
}

impl ChangeSet {
    /// Check if there is anything to migrate.
    pub fn is_empty(&self) -> bool {
        !self.initial && self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Whether a primary-key field is among the modified fields.
    pub fn modifies_primary(&self) -> bool {
        self.modified
            .iter()
            .any(|change| change.old.is_primary || change.new.is_primary)
    }

    /// Get a human-readable summary of the change set.
    pub fn summary(&self) -> String {
        if self.initial {
            return format!("Create collection {} ({} fields)", self.collection_name, self.added.len());
        }

        let mut parts = Vec::new();
        if !self.added.is_empty() {
            parts.push(format!("add {}", self.added.len()));
        }
        if !self.removed.is_empty() {
            parts.push(format!("remove {}", self.removed.len()));
        }
        if !self.modified.is_empty() {
            parts.push(format!("modify {}", self.modified.len()));
        }

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            format!("{}: {} fields", self.collection_name, parts.join(", "))
        }
    }
}

/// Compare a candidate schema against the last known one.
///
/// Fields are matched by name and compared after normalization, so
/// declaration order and absent-size spellings never count as changes.
/// A last known schema of a different collection is ignored, so the
/// candidate's collection is treated as new.
pub fn diff(old: Option<&Schema>, new: &Schema) -> ChangeSet {
    let old = old.filter(|o| o.collection_name == new.collection_name);
    let mut changes = ChangeSet {
        entity_name: new.entity_name.clone(),
        collection_name: new.collection_name.clone(),
        added: Vec::new(),
        removed: Vec::new(),
        modified: Vec::new(),
        initial: old.is_none(),
    };

    let Some(old) = old else {
        changes.added = new.fields.iter().map(SchemaField::normalized).collect();
        return changes;
    };

    let old_fields: HashMap<&str, &SchemaField> =
        old.fields.iter().map(|f| (f.name.as_str(), f)).collect();
    let new_fields: HashMap<&str, &SchemaField> =
        new.fields.iter().map(|f| (f.name.as_str(), f)).collect();

    for field in &new.fields {
        if !old_fields.contains_key(field.name.as_str()) {
            changes.added.push(field.normalized());
        }
    }

    for field in &old.fields {
        match new_fields.get(field.name.as_str()) {
            None => changes.removed.push(field.normalized()),
            Some(candidate) if !field.is_unchanged(candidate) => {
                debug!(
                    collection = %new.collection_name,
                    field = %field.name,
                    old = %field,
                    new = %candidate,
                    "field modified"
                );
                changes.modified.push(FieldChange {
                    old: field.normalized(),
                    new: candidate.normalized(),
                });
            }
            Some(_) => {}
        }
    }

    changes
}
