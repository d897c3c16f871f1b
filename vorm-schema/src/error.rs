//! Error types for entity parsing and introspection.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while reading entity declarations or building schemas.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(vorm::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Syntax error in a declaration file.
    #[error("syntax error: {message}")]
    #[diagnostic(code(vorm::schema::syntax_error))]
    SyntaxError {
        #[source_code]
        src: String,
        #[label("error here")]
        span: miette::SourceSpan,
        message: String,
    },

    /// Invalid entity definition.
    #[error("invalid entity `{name}`: {message}")]
    #[diagnostic(code(vorm::schema::invalid_entity))]
    InvalidEntity { name: String, message: String },

    /// Invalid field definition.
    #[error("invalid field `{entity}.{field}`: {message}")]
    #[diagnostic(code(vorm::schema::invalid_field))]
    InvalidField {
        entity: String,
        field: String,
        message: String,
    },

    /// Duplicate definition.
    #[error("duplicate {kind} `{name}`")]
    #[diagnostic(code(vorm::schema::duplicate))]
    Duplicate { kind: String, name: String },

    /// Unknown field type.
    #[error("unknown type `{type_name}` in `{entity}.{field}`")]
    #[diagnostic(code(vorm::schema::unknown_type))]
    UnknownType {
        entity: String,
        field: String,
        type_name: String,
    },

    /// Reference to an entity that was never declared.
    #[error("unknown entity `{name}` referenced by `{referenced_by}`")]
    #[diagnostic(code(vorm::schema::unknown_entity))]
    UnknownEntity { name: String, referenced_by: String },

    /// An entity inherits from itself.
    #[error("entity `{name}` inherits from itself")]
    #[diagnostic(code(vorm::schema::inheritance_cycle))]
    InheritanceCycle { name: String },

    /// Invalid attribute.
    #[error("invalid attribute `{attribute}`: {message}")]
    #[diagnostic(code(vorm::schema::invalid_attribute))]
    InvalidAttribute { attribute: String, message: String },

    /// A concrete entity without a collection name.
    #[error("entity `{entity}` does not declare a collection name")]
    #[diagnostic(
        code(vorm::schema::missing_collection),
        help("add `@@collection(\"...\")` or mark the entity `abstract`")
    )]
    MissingCollection { entity: String },
}

impl SchemaError {
    /// Create a syntax error with source location.
    pub fn syntax(
        src: impl Into<String>,
        offset: usize,
        len: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::SyntaxError {
            src: src.into(),
            span: (offset, len).into(),
            message: message.into(),
        }
    }

    /// Create an invalid entity error.
    pub fn invalid_entity(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEntity {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid field error.
    pub fn invalid_field(
        entity: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            entity: entity.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an unknown type error.
    pub fn unknown_type(
        entity: impl Into<String>,
        field: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::UnknownType {
            entity: entity.into(),
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an unknown entity error.
    pub fn unknown_entity(name: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::UnknownEntity {
            name: name.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Create a missing collection error.
    pub fn missing_collection(entity: impl Into<String>) -> Self {
        Self::MissingCollection {
            entity: entity.into(),
        }
    }
}
