//! Field descriptors for collection schemas.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Default `max_length` applied to string fields without a usable length.
pub const DEFAULT_MAX_LENGTH: i64 = 100;

/// Default dimension applied to vector fields without a usable dimension.
pub const DEFAULT_DIM: i64 = 1536;

/// Logical type of a collection field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    /// Variable-length string, bounded by `max_length`.
    #[serde(alias = "VARCHAR")]
    String,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit float.
    #[serde(alias = "FLOAT")]
    Float32,
    /// 64-bit float.
    #[serde(alias = "DOUBLE")]
    Float64,
    /// Boolean.
    Bool,
    /// Arbitrary JSON document.
    Json,
    /// Fixed-dimension float vector.
    FloatVector,
    /// Array of scalars.
    Array,
}

impl DataType {
    /// Parse a type name as written in declaration files or history records.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "String" | "STRING" | "VARCHAR" => Some(Self::String),
            "Int64" | "INT64" => Some(Self::Int64),
            "Float32" | "Float" | "FLOAT32" | "FLOAT" => Some(Self::Float32),
            "Float64" | "Double" | "FLOAT64" | "DOUBLE" => Some(Self::Float64),
            "Bool" | "Boolean" | "BOOL" => Some(Self::Bool),
            "Json" | "JSON" => Some(Self::Json),
            "FloatVector" | "FLOAT_VECTOR" => Some(Self::FloatVector),
            "Array" | "ARRAY" => Some(Self::Array),
            _ => None,
        }
    }

    /// The canonical tag used in persisted records.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Int64 => "INT64",
            Self::Float32 => "FLOAT32",
            Self::Float64 => "FLOAT64",
            Self::Bool => "BOOL",
            Self::Json => "JSON",
            Self::FloatVector => "FLOAT_VECTOR",
            Self::Array => "ARRAY",
        }
    }

    /// Whether this type carries a `max_length`.
    pub fn uses_max_length(&self) -> bool {
        matches!(self, Self::String)
    }

    /// Whether this type carries a `dim`.
    pub fn uses_dim(&self) -> bool {
        matches!(self, Self::FloatVector)
    }

    /// Whether this is a vector type that gets an index on collection creation.
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::FloatVector)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Description of one collection field.
///
/// `max_length` and `dim` hold the values as declared or as read from a
/// history record. Comparison between descriptors always goes through
/// [`SchemaField::normalized`], so `None`, `-1` and `"None"` are equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name, unique within a schema.
    pub name: String,
    /// Logical type tag.
    #[serde(rename = "dtype")]
    pub data_type: DataType,
    /// Maximum string length.
    #[serde(
        default,
        deserialize_with = "deserialize_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_length: Option<i64>,
    /// Vector dimension.
    #[serde(
        default,
        deserialize_with = "deserialize_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub dim: Option<i64>,
    /// Whether this field is the primary key.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_primary: bool,
}

impl SchemaField {
    /// Create a field with no size attributes.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            max_length: None,
            dim: None,
            is_primary: false,
        }
    }

    /// Set the raw maximum length.
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Set the raw vector dimension.
    pub fn with_dim(mut self, dim: i64) -> Self {
        self.dim = Some(dim);
        self
    }

    /// Mark the field as the primary key.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// The `max_length` the remote store will see.
    pub fn effective_max_length(&self) -> Option<i64> {
        if !self.data_type.uses_max_length() {
            return None;
        }
        Some(self.max_length.filter(|len| *len > 0).unwrap_or(DEFAULT_MAX_LENGTH))
    }

    /// The `dim` the remote store will see.
    pub fn effective_dim(&self) -> Option<i64> {
        if !self.data_type.uses_dim() {
            return None;
        }
        Some(self.dim.filter(|dim| *dim > 0).unwrap_or(DEFAULT_DIM))
    }

    /// A copy with type-appropriate defaults applied and unused attributes cleared.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.clone(),
            data_type: self.data_type,
            max_length: self.effective_max_length(),
            dim: self.effective_dim(),
            is_primary: self.is_primary,
        }
    }

    /// Whether two descriptors of the same field are equivalent after normalization.
    pub fn is_unchanged(&self, other: &SchemaField) -> bool {
        self.data_type == other.data_type
            && self.effective_max_length() == other.effective_max_length()
            && self.effective_dim() == other.effective_dim()
            && self.is_primary == other.is_primary
    }
}

impl fmt::Display for SchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)?;
        if let Some(len) = self.effective_max_length() {
            write!(f, "(max_length={})", len)?;
        }
        if let Some(dim) = self.effective_dim() {
            write!(f, "(dim={})", dim)?;
        }
        if self.is_primary {
            f.write_str(" primary")?;
        }
        Ok(())
    }
}

/// Parse a size attribute stored as text.
///
/// `"None"`, `"-1"` and the empty string mean the attribute is absent.
pub fn parse_size(raw: &str) -> Result<Option<i64>, std::num::ParseIntError> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "None" || raw == "null" {
        return Ok(None);
    }
    let value: i64 = raw.parse()?;
    Ok(if value == -1 { None } else { Some(value) })
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Int(i64),
        Text(String),
    }

    match Option::<RawSize>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawSize::Int(-1)) => Ok(None),
        Some(RawSize::Int(value)) => Ok(Some(value)),
        Some(RawSize::Text(text)) => parse_size(&text).map_err(|e| {
            serde::de::Error::custom(format!("invalid size attribute `{}`: {}", text, e))
        }),
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_defaults_to_100() {
        let field = SchemaField::new("title", DataType::String);
        assert_eq!(field.effective_max_length(), Some(100));
        assert_eq!(field.effective_dim(), None);
    }

    #[test]
    fn test_vector_defaults_to_1536() {
        let field = SchemaField::new("embedding", DataType::FloatVector).with_dim(0);
        assert_eq!(field.effective_dim(), Some(1536));
        assert_eq!(field.effective_max_length(), None);
    }

    #[test]
    fn test_unused_attributes_are_cleared() {
        let field = SchemaField::new("count", DataType::Int64)
            .with_max_length(20)
            .with_dim(8);
        let normalized = field.normalized();
        assert_eq!(normalized.max_length, None);
        assert_eq!(normalized.dim, None);
    }

    #[test]
    fn test_absent_length_spellings_are_equivalent() {
        let absent: SchemaField =
            serde_json::from_str(r#"{"name":"type","dtype":"STRING"}"#).unwrap();
        let negative: SchemaField =
            serde_json::from_str(r#"{"name":"type","dtype":"STRING","max_length":-1}"#).unwrap();
        let text: SchemaField =
            serde_json::from_str(r#"{"name":"type","dtype":"STRING","max_length":"None"}"#)
                .unwrap();

        assert!(absent.is_unchanged(&negative));
        assert!(negative.is_unchanged(&text));
        assert!(text.is_unchanged(&absent));
    }

    #[test]
    fn test_text_length_is_coerced() {
        let field: SchemaField =
            serde_json::from_str(r#"{"name":"type","dtype":"VARCHAR","max_length":"50"}"#)
                .unwrap();
        assert_eq!(field.data_type, DataType::String);
        assert_eq!(field.max_length, Some(50));
    }

    #[test]
    fn test_unknown_type_tag_is_rejected() {
        let result: Result<SchemaField, _> =
            serde_json::from_str(r#"{"name":"x","dtype":"BINARY_VECTOR"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_primary_flag_matters() {
        let a = SchemaField::new("id", DataType::String).with_max_length(100);
        let b = a.clone().primary();
        assert!(!a.is_unchanged(&b));
    }

    #[test]
    fn test_serialization_skips_absent_attributes() {
        let field = SchemaField::new("priority", DataType::Int64);
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"name":"priority","dtype":"INT64"}"#);
    }

    #[test]
    fn test_display() {
        let field = SchemaField::new("id", DataType::String)
            .with_max_length(100)
            .primary();
        assert_eq!(field.to_string(), "id: STRING(max_length=100) primary");
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("None").unwrap(), None);
        assert_eq!(parse_size("-1").unwrap(), None);
        assert_eq!(parse_size(" 42 ").unwrap(), Some(42));
        assert!(parse_size("wide").is_err());
    }
}
