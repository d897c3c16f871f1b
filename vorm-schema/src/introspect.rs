//! Build schema snapshots from entity definitions.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::ast::{EntityDef, FieldDecl};
use crate::error::{SchemaError, SchemaResult};
use crate::registry::EntityRegistry;
use crate::schema::Schema;

/// Resolves entity definitions, including inheritance, into [`Schema`]s.
pub struct Introspector<'a> {
    registry: &'a EntityRegistry,
}

impl<'a> Introspector<'a> {
    /// Create an introspector over a registry.
    pub fn new(registry: &'a EntityRegistry) -> Self {
        Self { registry }
    }

    /// The candidate schema for one concrete entity.
    pub fn schema_for(&self, name: &str) -> SchemaResult<Schema> {
        let entity = self
            .registry
            .get(name)
            .ok_or_else(|| SchemaError::unknown_entity(name, "introspection"))?;

        if entity.is_abstract {
            return Err(SchemaError::invalid_entity(
                name,
                "abstract entities do not map to a collection",
            ));
        }
        let collection = entity
            .collection_name()
            .ok_or_else(|| SchemaError::missing_collection(name))?;

        let fields: Vec<_> = self
            .effective_fields(name)?
            .values()
            .map(FieldDecl::to_schema_field)
            .collect();

        let primary = fields.iter().filter(|f| f.is_primary).count();
        if primary != 1 {
            warn!(
                entity = name,
                primary_fields = primary,
                "entity should declare exactly one primary field"
            );
        }
        debug!(entity = name, collection, fields = fields.len(), "introspected entity");

        Ok(Schema::new(name, collection, fields).with_migration_table(entity.is_migration_table()))
    }

    /// Schemas for every concrete entity, in registration order.
    pub fn schemas(&self) -> SchemaResult<Vec<Schema>> {
        self.registry
            .concrete()
            .map(|e| self.schema_for(e.name()))
            .collect()
    }

    /// Persisted fields of an entity after inheritance, in layout order.
    ///
    /// Base fields come first, the last listed base outermost; a later
    /// declaration of the same name replaces the value but keeps the position.
    pub fn effective_fields(&self, name: &str) -> SchemaResult<IndexMap<SmolStr, FieldDecl>> {
        let mut stack = Vec::new();
        self.resolve(name, name, &mut stack)
    }

    fn resolve(
        &self,
        name: &str,
        referenced_by: &str,
        stack: &mut Vec<SmolStr>,
    ) -> SchemaResult<IndexMap<SmolStr, FieldDecl>> {
        let entity: &EntityDef = self
            .registry
            .get(name)
            .ok_or_else(|| SchemaError::unknown_entity(name, referenced_by))?;

        if stack.contains(&entity.name.name) {
            return Err(SchemaError::InheritanceCycle {
                name: entity.name().to_string(),
            });
        }
        stack.push(entity.name.name.clone());

        let mut fields = IndexMap::new();
        for base in entity.extends.iter().rev() {
            for (key, field) in self.resolve(base.as_str(), entity.name(), stack)? {
                fields.insert(key, field);
            }
        }
        for (key, field) in &entity.fields {
            if field.is_ignored() {
                fields.shift_remove(key);
            } else {
                fields.insert(key.clone(), field.clone());
            }
        }

        stack.pop();
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::DataType;
    use crate::parser::parse_entities;
    use pretty_assertions::assert_eq;

    fn registry(src: &str) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        for entity in parse_entities(src).unwrap() {
            registry.register(entity).unwrap();
        }
        registry
    }

    #[test]
    fn test_schema_for_rule() {
        let registry = registry(
            r#"entity Rule {
                @@collection("rules")
                id          String @primary
                type        String(50)
                description String(1000)
                scratch     String @ignore
            }"#,
        );
        let schema = Introspector::new(&registry).schema_for("Rule").unwrap();
        assert_eq!(schema.entity_name, "Rule");
        assert_eq!(schema.collection_name, "rules");
        assert_eq!(schema.field_names(), vec!["id", "type", "description"]);
        assert_eq!(schema.fields[0].max_length, Some(100));
        assert_eq!(schema.version, 0);
    }

    #[test]
    fn test_missing_collection_is_an_error() {
        let registry = registry("entity Rule { id String @primary }");
        let err = Introspector::new(&registry).schema_for("Rule").unwrap_err();
        assert!(matches!(err, SchemaError::MissingCollection { .. }));
    }

    #[test]
    fn test_inherited_fields_once_with_override() {
        let registry = registry(
            r#"
            abstract entity Base {
                id    String @primary
                notes String(10)
            }
            abstract entity Audited extends Base {
                created_at Int64
            }
            entity Rule extends Audited, Base {
                @@collection("rules")
                notes String(500)
            }
            "#,
        );
        let schema = Introspector::new(&registry).schema_for("Rule").unwrap();
        assert_eq!(schema.field_names(), vec!["id", "notes", "created_at"]);
        assert_eq!(schema.get_field("notes").unwrap().max_length, Some(500));
    }

    #[test]
    fn test_first_base_wins() {
        let registry = registry(
            r#"
            abstract entity A { tag String(10) }
            abstract entity B { tag String(20) }
            entity C extends A, B { @@collection("c") id Int64 @primary }
            "#,
        );
        let schema = Introspector::new(&registry).schema_for("C").unwrap();
        assert_eq!(schema.get_field("tag").unwrap().max_length, Some(10));
    }

    #[test]
    fn test_own_ignore_removes_inherited() {
        let registry = registry(
            r#"
            abstract entity Base { id String @primary cache Json }
            entity Rule extends Base { @@collection("rules") cache Json @ignore }
            "#,
        );
        let schema = Introspector::new(&registry).schema_for("Rule").unwrap();
        assert_eq!(schema.field_names(), vec!["id"]);
    }

    #[test]
    fn test_inheritance_cycle() {
        let registry = registry(
            r#"
            entity A extends B { @@collection("a") }
            entity B extends A { @@collection("b") }
            "#,
        );
        let err = Introspector::new(&registry).schema_for("A").unwrap_err();
        assert!(matches!(err, SchemaError::InheritanceCycle { .. }));
    }

    #[test]
    fn test_unknown_base() {
        let registry = registry(r#"entity A extends Missing { @@collection("a") }"#);
        let err = Introspector::new(&registry).schema_for("A").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnknownEntity { ref name, ref referenced_by } if name == "Missing" && referenced_by == "A"
        ));
    }

    #[test]
    fn test_migration_table_flag() {
        let registry = registry(
            r#"entity History { @@collection("migration_history") @@migration_table id String @primary }"#,
        );
        let schema = Introspector::new(&registry).schema_for("History").unwrap();
        assert!(schema.is_migration_table);
    }

    #[test]
    fn test_schemas_skip_abstract() {
        let registry = registry(
            r#"
            abstract entity Base { id String @primary }
            entity Rule extends Base { @@collection("rules") v FloatVector }
            "#,
        );
        let schemas = Introspector::new(&registry).schemas().unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].get_field("v").unwrap().data_type, DataType::FloatVector);
        assert_eq!(schemas[0].get_field("v").unwrap().dim, Some(1536));
    }
}
