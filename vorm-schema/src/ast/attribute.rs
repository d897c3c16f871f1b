//! Attributes attached to entities (`@@name`) and fields (`@name`).

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{Ident, Span};

/// One positional argument, e.g. `"rules"` in `@@collection("rules")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Quoted text.
    String(String),
    /// Integer literal.
    Int(i64),
    /// Unquoted name.
    Ident(SmolStr),
}

impl AttributeValue {
    /// The text of a quoted argument.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value of an integer argument.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// `@name(args)` on a field or `@@name(args)` on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name without the `@` / `@@` prefix.
    pub name: Ident,
    /// Positional arguments in source order.
    pub args: Vec<AttributeValue>,
    /// Where the attribute was written.
    pub span: Span,
}

impl Attribute {
    /// Attribute parsed at `span`.
    pub fn new(name: Ident, args: Vec<AttributeValue>, span: Span) -> Self {
        Self { name, args, span }
    }

    /// Attribute for builder-made definitions.
    pub fn detached(name: &str, args: Vec<AttributeValue>) -> Self {
        Self::new(Ident::detached(name), args, Span::default())
    }

    /// Whether the attribute is `name`.
    pub fn is(&self, name: &str) -> bool {
        self.name.as_str() == name
    }

    /// The first positional argument.
    pub fn first_arg(&self) -> Option<&AttributeValue> {
        self.args.first()
    }
}
