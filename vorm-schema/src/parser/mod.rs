//! Parser for `.vorm` entity declaration files.

mod grammar;

use std::collections::HashSet;
use std::path::Path;

use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;

use crate::ast::*;
use crate::error::{SchemaError, SchemaResult};
use crate::field::DataType;

pub use grammar::{Rule, VormParser};

/// Field attributes the language understands.
const FIELD_ATTRIBUTES: &[&str] = &["primary", "ignore"];

/// Parse every entity declared in a string.
pub fn parse_entities(input: &str) -> SchemaResult<Vec<EntityDef>> {
    let mut pairs = VormParser::parse(Rule::schema, input).map_err(|e| {
        let (offset, len) = match e.location {
            InputLocation::Pos(pos) => (pos, 0),
            InputLocation::Span((start, end)) => (start, end - start),
        };
        SchemaError::syntax(input, offset, len, e.variant.message().to_string())
    })?;

    let Some(schema_pair) = pairs.next() else {
        return Ok(Vec::new());
    };

    let mut entities: Vec<EntityDef> = Vec::new();
    for pair in schema_pair.into_inner() {
        if pair.as_rule() != Rule::entity_def {
            continue;
        }
        let entity = parse_entity(pair)?;
        if entities.iter().any(|e| e.name() == entity.name()) {
            return Err(SchemaError::duplicate("entity", entity.name()));
        }
        entities.push(entity);
    }

    Ok(entities)
}

/// Parse every entity declared in a file.
pub fn parse_entity_file(path: impl AsRef<Path>) -> SchemaResult<Vec<EntityDef>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_entities(&content)
}

fn ident(pair: &Pair<'_, Rule>) -> Ident {
    Ident::new(pair.as_str(), pair.as_span().into())
}

fn parse_entity(pair: Pair<'_, Rule>) -> SchemaResult<EntityDef> {
    let span = pair.as_span();
    let mut entity = EntityDef::new("");
    entity.span = span.into();

    let mut seen_fields = HashSet::new();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::abstract_marker => entity.is_abstract = true,
            Rule::identifier => entity.name = ident(&item),
            Rule::extends_clause => {
                for base in item.into_inner() {
                    if base.as_rule() == Rule::identifier {
                        entity.extends.push(ident(&base));
                    }
                }
            }
            Rule::entity_attribute => {
                let attr = parse_attribute(item)?;
                validate_entity_attribute(&entity, &attr)?;
                entity.attributes.push(attr);
            }
            Rule::field_def => {
                let field = parse_field(entity.name(), item)?;
                if !seen_fields.insert(field.name.name.clone()) {
                    return Err(SchemaError::duplicate(
                        "field",
                        format!("{}.{}", entity.name(), field.name()),
                    ));
                }
                entity.fields.insert(field.name.name.clone(), field);
            }
            _ => {}
        }
    }

    if entity.extends.iter().any(|base| base.name == entity.name.name) {
        return Err(SchemaError::InheritanceCycle {
            name: entity.name().to_string(),
        });
    }
    if entity.is_abstract && entity.collection_name().is_some() {
        return Err(SchemaError::invalid_entity(
            entity.name(),
            "abstract entities cannot declare a collection",
        ));
    }

    Ok(entity)
}

fn validate_entity_attribute(entity: &EntityDef, attr: &Attribute) -> SchemaResult<()> {
    let name = attr.name.as_str();
    let ok = match name {
        "collection" => {
            if entity.get_attribute("collection").is_some() {
                return Err(SchemaError::duplicate(
                    "attribute",
                    format!("{}.@@collection", entity.name()),
                ));
            }
            matches!(attr.args.as_slice(), [AttributeValue::String(s)] if !s.is_empty())
        }
        "migration_table" => attr.args.is_empty(),
        _ => {
            return Err(SchemaError::invalid_attribute(
                format!("@@{}", name),
                format!("unknown entity attribute on `{}`", entity.name()),
            ));
        }
    };

    if ok {
        Ok(())
    } else {
        Err(SchemaError::invalid_attribute(
            format!("@@{}", name),
            match name {
                "collection" => "expected a single non-empty string argument",
                _ => "takes no arguments",
            },
        ))
    }
}

fn parse_field(entity: &str, pair: Pair<'_, Rule>) -> SchemaResult<FieldDecl> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();

    let name = inner
        .next()
        .map(|p| ident(&p))
        .ok_or_else(|| SchemaError::invalid_entity(entity, "field without a name"))?;

    let type_pair = inner.next().ok_or_else(|| {
        SchemaError::invalid_field(entity, name.as_str(), "missing field type")
    })?;
    let (data_type, param) = parse_field_type(entity, name.as_str(), type_pair)?;

    let mut field = FieldDecl::new(name.name.clone(), data_type);
    field.name = name;
    field.param = param;
    field.span = span.into();

    for attr_pair in inner {
        if attr_pair.as_rule() != Rule::field_attribute {
            continue;
        }
        let attr = parse_attribute(attr_pair)?;
        if !FIELD_ATTRIBUTES.contains(&attr.name.as_str()) {
            return Err(SchemaError::invalid_attribute(
                format!("@{}", attr.name),
                format!("unknown field attribute on `{}.{}`", entity, field.name()),
            ));
        }
        if !attr.args.is_empty() {
            return Err(SchemaError::invalid_attribute(
                format!("@{}", attr.name),
                "takes no arguments",
            ));
        }
        if field.has_attribute(attr.name.as_str()) {
            return Err(SchemaError::duplicate(
                "attribute",
                format!("{}.{}.@{}", entity, field.name(), attr.name),
            ));
        }
        field.attributes.push(attr);
    }

    if field.is_primary() && field.is_ignored() {
        return Err(SchemaError::invalid_field(
            entity,
            field.name(),
            "a primary key cannot be ignored",
        ));
    }

    Ok(field)
}

fn parse_field_type(
    entity: &str,
    field: &str,
    pair: Pair<'_, Rule>,
) -> SchemaResult<(DataType, Option<i64>)> {
    let mut inner = pair.into_inner();
    let type_name = inner
        .next()
        .map(|p| p.as_str())
        .ok_or_else(|| SchemaError::invalid_field(entity, field, "missing field type"))?;
    let data_type = DataType::from_str(type_name)
        .ok_or_else(|| SchemaError::unknown_type(entity, field, type_name))?;

    let param = match inner.next().and_then(|p| p.into_inner().next()) {
        Some(int) => Some(int.as_str().parse::<i64>().map_err(|e| {
            SchemaError::invalid_field(entity, field, format!("invalid type parameter: {}", e))
        })?),
        None => None,
    };

    if param.is_some() && !data_type.uses_max_length() && !data_type.uses_dim() {
        return Err(SchemaError::invalid_field(
            entity,
            field,
            format!("type `{}` takes no parameter", type_name),
        ));
    }

    Ok((data_type, param))
}

fn parse_attribute(pair: Pair<'_, Rule>) -> SchemaResult<Attribute> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();

    let name = inner
        .next()
        .map(|p| ident(&p))
        .ok_or_else(|| SchemaError::invalid_attribute("@", "missing attribute name"))?;

    let mut args = Vec::new();
    if let Some(args_pair) = inner.next() {
        for value in args_pair.into_inner() {
            args.push(parse_attribute_value(&name, value)?);
        }
    }

    Ok(Attribute::new(name, args, span.into()))
}

fn parse_attribute_value(attr: &Ident, pair: Pair<'_, Rule>) -> SchemaResult<AttributeValue> {
    match pair.as_rule() {
        Rule::string_literal => Ok(AttributeValue::String(
            pair.into_inner()
                .next()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        )),
        Rule::integer => pair
            .as_str()
            .parse()
            .map(AttributeValue::Int)
            .map_err(|e| SchemaError::invalid_attribute(attr.as_str(), format!("{}", e))),
        _ => Ok(AttributeValue::Ident(pair.as_str().into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RULE: &str = r#"
        // rules evaluated by the engine
        abstract entity Timestamped {
            created_at Int64
        }

        entity Rule extends Timestamped {
            @@collection("rules")

            id          String(100) @primary
            type        String(50)
            description String(1000)
            embedding   FloatVector(1536)
            metadata    Json
            cached      String @ignore
        }
    "#;

    #[test]
    fn test_parse_entities() {
        let entities = parse_entities(RULE).unwrap();
        assert_eq!(entities.len(), 2);

        let base = &entities[0];
        assert!(base.is_abstract);
        assert_eq!(base.name(), "Timestamped");

        let rule = &entities[1];
        assert!(!rule.is_abstract);
        assert_eq!(rule.collection_name(), Some("rules"));
        assert_eq!(rule.extends[0].as_str(), "Timestamped");
        assert_eq!(
            rule.fields.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            vec!["id", "type", "description", "embedding", "metadata", "cached"]
        );
        assert!(rule.fields["id"].is_primary());
        assert_eq!(rule.fields["description"].param, Some(1000));
        assert!(rule.fields["cached"].is_ignored());
    }

    #[test]
    fn test_parse_migration_table() {
        let entities = parse_entities(
            r#"entity History { @@collection("migration_history") @@migration_table id String @primary }"#,
        )
        .unwrap();
        assert!(entities[0].is_migration_table());
    }

    #[test]
    fn test_parse_tag_type_names() {
        let entities =
            parse_entities("entity A { @@collection(\"a\") id VARCHAR(10) @primary v FLOAT_VECTOR(4) }")
                .unwrap();
        assert_eq!(entities[0].fields["id"].data_type, DataType::String);
        assert_eq!(entities[0].fields["v"].data_type, DataType::FloatVector);
    }

    #[test]
    fn test_unknown_type() {
        let err = parse_entities("entity A { x Decimal }").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { ref type_name, .. } if type_name == "Decimal"));
    }

    #[test]
    fn test_parameter_on_wrong_type() {
        let err = parse_entities("entity A { x Int64(8) }").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { .. }));
    }

    #[test]
    fn test_unknown_attribute() {
        let err = parse_entities("entity A { x Int64 @unique }").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidAttribute { .. }));

        let err = parse_entities("entity A { @@index(\"x\") }").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_collection_requires_string() {
        let err = parse_entities("entity A { @@collection(rules) }").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_duplicate_field() {
        let err = parse_entities("entity A { x Int64 x Bool }").unwrap_err();
        assert!(matches!(err, SchemaError::Duplicate { ref name, .. } if name == "A.x"));
    }

    #[test]
    fn test_duplicate_entity() {
        let err = parse_entities("entity A {} entity A {}").unwrap_err();
        assert!(matches!(err, SchemaError::Duplicate { ref kind, .. } if kind == "entity"));
    }

    #[test]
    fn test_duplicate_entity_across_lines() {
        let err = parse_entities(
            r#"
            entity Rule { @@collection("rules") id String @primary }

            entity Rule { @@collection("rules_v2") id String @primary }
            "#,
        )
        .unwrap_err();
        match err {
            SchemaError::Duplicate { kind, name } => {
                assert_eq!(kind, "entity");
                assert_eq!(name, "Rule");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_self_inheritance() {
        let err = parse_entities("entity A extends A {}").unwrap_err();
        assert!(matches!(err, SchemaError::InheritanceCycle { .. }));
    }

    #[test]
    fn test_syntax_error_has_location() {
        let input = "entity A {\n  x \n}";
        match parse_entities(input).unwrap_err() {
            SchemaError::SyntaxError { span, .. } => assert!(span.offset() > 0),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_spans_recorded() {
        let entities = parse_entities("entity A { x Int64 }").unwrap();
        let field = &entities[0].fields["x"];
        assert_eq!(field.span.start, 11);
        assert_eq!(entities[0].name.span, Span::new(7, 8));
    }

    #[test]
    fn test_parse_entity_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rule.vorm");
        std::fs::write(&path, RULE).unwrap();
        assert_eq!(parse_entity_file(&path).unwrap().len(), 2);

        let missing = parse_entity_file(dir.path().join("missing.vorm")).unwrap_err();
        assert!(matches!(missing, SchemaError::IoError { .. }));
    }
}
