//! Field declarations inside an entity.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{Attribute, Ident, Span};
use crate::field::{DataType, SchemaField};

/// A field declaration as written in an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name.
    pub name: Ident,
    /// Declared type.
    pub data_type: DataType,
    /// Type parameter: max length for strings, dimension for vectors.
    pub param: Option<i64>,
    /// Field attributes (`@primary`, `@ignore`).
    pub attributes: Vec<Attribute>,
    /// Source location.
    pub span: Span,
}

impl FieldDecl {
    /// Create a new field declaration.
    pub fn new(name: impl Into<SmolStr>, data_type: DataType) -> Self {
        Self {
            name: Ident::detached(name),
            data_type,
            param: None,
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    /// Set the maximum string length.
    pub fn max_length(mut self, max_length: i64) -> Self {
        self.param = Some(max_length);
        self
    }

    /// Set the vector dimension.
    pub fn dim(mut self, dim: i64) -> Self {
        self.param = Some(dim);
        self
    }

    /// Mark the field as the primary key.
    pub fn primary(self) -> Self {
        self.with_attribute(Attribute::detached("primary", Vec::new()))
    }

    /// Mark the field as in-memory only.
    pub fn ignored(self) -> Self {
        self.with_attribute(Attribute::detached("ignore", Vec::new()))
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Field name as a string slice.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Check if the field has an attribute.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.is(name))
    }

    /// Check if this is the primary key.
    pub fn is_primary(&self) -> bool {
        self.has_attribute("primary")
    }

    /// Check if this field is excluded from the persisted schema.
    pub fn is_ignored(&self) -> bool {
        self.has_attribute("ignore")
    }

    /// The normalized descriptor the collection stores.
    pub fn to_schema_field(&self) -> SchemaField {
        let mut field = SchemaField::new(self.name.as_str(), self.data_type);
        if let Some(param) = self.param {
            if self.data_type.uses_max_length() {
                field = field.with_max_length(param);
            } else if self.data_type.uses_dim() {
                field = field.with_dim(param);
            }
        }
        if self.is_primary() {
            field = field.primary();
        }
        field.normalized()
    }
}
