//! Entity definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{Attribute, AttributeValue, FieldDecl, Ident, Span};

/// An entity definition: a named field set mapped to one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity name.
    pub name: Ident,
    /// Abstract entities only contribute fields to subentities.
    pub is_abstract: bool,
    /// Base entities, highest precedence first.
    pub extends: Vec<Ident>,
    /// Own field declarations in declaration order.
    pub fields: IndexMap<SmolStr, FieldDecl>,
    /// Entity attributes (`@@collection`, `@@migration_table`).
    pub attributes: Vec<Attribute>,
    /// Source location.
    pub span: Span,
}

impl EntityDef {
    /// Create a new concrete entity with no fields.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: Ident::detached(name),
            is_abstract: false,
            extends: Vec::new(),
            fields: IndexMap::new(),
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    /// Set the collection name.
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.attributes.retain(|a| !a.is("collection"));
        self.attributes.push(Attribute::detached(
            "collection",
            vec![AttributeValue::String(collection.into())],
        ));
        self
    }

    /// Mark this entity as the bookkeeping collection.
    pub fn migration_table(mut self) -> Self {
        if !self.is_migration_table() {
            self.attributes
                .push(Attribute::detached("migration_table", Vec::new()));
        }
        self
    }

    /// Mark this entity as abstract.
    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Add a base entity. Earlier bases take precedence.
    pub fn extends(mut self, base: impl Into<SmolStr>) -> Self {
        self.extends.push(Ident::detached(base));
        self
    }

    /// Add or replace a field declaration.
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.insert(field.name.name.clone(), field);
        self
    }

    /// Entity name as a string slice.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Get an entity attribute by name.
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is(name))
    }

    /// The declared collection name.
    pub fn collection_name(&self) -> Option<&str> {
        self.get_attribute("collection")
            .and_then(|a| a.first_arg())
            .and_then(|v| v.as_string())
    }

    /// Whether this entity is the bookkeeping collection.
    pub fn is_migration_table(&self) -> bool {
        self.get_attribute("migration_table").is_some()
    }

    /// Get an own field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.get(name)
    }
}
