//! Column definitions

use schemagen_ir::{DefaultValue, EnumType, Field, ObjectType, ScalarType};

use crate::escape::{quote_identifier, quote_literal};
use crate::SqlError;

/// Type used for primary keys and every column referencing one.
pub const KEY_TYPE: &str = "INT UNSIGNED";

pub fn scalar_column(object_type: &ObjectType, field: &Field) -> Result<String, SqlError> {
    let scalar = field.scalar_type().ok_or_else(|| SqlError::UnsupportedScalar {
        object_type: object_type.name().to_string(),
        field: field.name().to_string(),
        type_name: field.type_name().to_string(),
    })?;

    let is_primary_key = object_type.primary_key().map(Field::name) == Some(field.name());
    if is_primary_key {
        return Ok(format!(
            "{} {} NOT NULL AUTO_INCREMENT PRIMARY KEY",
            quote_identifier(field.name()),
            KEY_TYPE
        ));
    }

    let sql_type = match scalar {
        ScalarType::ID => KEY_TYPE.to_string(),
        ScalarType::String => format!("VARCHAR({})", field.max_length()),
        ScalarType::Int => "INT".to_string(),
        ScalarType::Float => "FLOAT".to_string(),
        ScalarType::Boolean => "BOOLEAN".to_string(),
        ScalarType::DateTime => "DATETIME".to_string(),
    };
    Ok(with_modifiers(field, sql_type))
}

pub fn enum_column(field: &Field, enum_type: &EnumType) -> String {
    let values = enum_type
        .values()
        .iter()
        .map(|v| quote_literal(v))
        .collect::<Vec<_>>()
        .join(", ");
    with_modifiers(field, format!("ENUM({})", values))
}

pub fn foreign_key_column(column: &str, required: bool) -> String {
    let mut sql = format!("{} {}", quote_identifier(column), KEY_TYPE);
    if required {
        sql.push_str(" NOT NULL");
    }
    sql
}

pub fn timestamp_columns() -> [String; 2] {
    [
        format!(
            "{} TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP",
            quote_identifier("created_at")
        ),
        format!(
            "{} TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP",
            quote_identifier("updated_at")
        ),
    ]
}

/// Render a default as a SQL literal.
pub fn default_literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::String(s) | DefaultValue::Enum(s) => quote_literal(s),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Boolean(true) => "TRUE".to_string(),
        DefaultValue::Boolean(false) => "FALSE".to_string(),
    }
}

fn with_modifiers(field: &Field, sql_type: String) -> String {
    let mut sql = format!("{} {}", quote_identifier(field.name()), sql_type);
    if field.is_required() {
        sql.push_str(" NOT NULL");
    }
    if let Some(value) = field.default_value() {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default_literal(value));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagen_ir::{FieldKind, FieldOptions};

    fn post(fields: Vec<Field>) -> ObjectType {
        let mut all = vec![Field::scalar("id", ScalarType::ID).required(true)];
        all.extend(fields);
        ObjectType::new("Post", all)
    }

    #[test]
    fn test_primary_key_column() {
        let post = post(vec![]);
        let sql = scalar_column(&post, &post.fields()[0]).unwrap();
        assert_eq!(sql, "`id` INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY");
    }

    #[test]
    fn test_scalar_columns() {
        let post = post(vec![
            Field::scalar("title", ScalarType::String).required(true),
            Field::scalar("summary", ScalarType::String).with_options(FieldOptions {
                max_length: Some(500),
                ..Default::default()
            }),
            Field::scalar("views", ScalarType::Int).with_options(FieldOptions {
                default_value: Some(DefaultValue::Int(0)),
                ..Default::default()
            }),
            Field::scalar("rating", ScalarType::Float),
            Field::scalar("draft", ScalarType::Boolean).with_options(FieldOptions {
                default_value: Some(DefaultValue::Boolean(true)),
                ..Default::default()
            }),
            Field::scalar("publishedAt", ScalarType::DateTime),
        ]);

        let columns: Vec<_> = post.fields()[1..]
            .iter()
            .map(|f| scalar_column(&post, f).unwrap())
            .collect();
        assert_eq!(
            columns,
            vec![
                "`title` VARCHAR(255) NOT NULL",
                "`summary` VARCHAR(500)",
                "`views` INT DEFAULT 0",
                "`rating` FLOAT",
                "`draft` BOOLEAN DEFAULT TRUE",
                "`publishedAt` DATETIME",
            ]
        );
    }

    #[test]
    fn test_enum_column_with_default() {
        let status = EnumType::new("Status", vec!["ACTIVE".into(), "ARCHIVED".into()]);
        let field = Field::new("status", "Status", FieldKind::Enum)
            .required(true)
            .with_options(FieldOptions {
                default_value: Some(DefaultValue::Enum("ACTIVE".into())),
                ..Default::default()
            });
        assert_eq!(
            enum_column(&field, &status),
            "`status` ENUM('ACTIVE', 'ARCHIVED') NOT NULL DEFAULT 'ACTIVE'"
        );
    }

    #[test]
    fn test_non_scalar_is_rejected() {
        let post = post(vec![Field::new("author", "Author", FieldKind::Relation)]);
        let err = scalar_column(&post, &post.fields()[1]).unwrap_err();
        assert!(matches!(err, SqlError::UnsupportedScalar { ref type_name, .. } if type_name == "Author"));
    }

    #[test]
    fn test_default_literals() {
        assert_eq!(default_literal(&DefaultValue::String("it's".into())), "'it''s'");
        assert_eq!(default_literal(&DefaultValue::Float(1.5)), "1.5");
        assert_eq!(default_literal(&DefaultValue::Boolean(false)), "FALSE");
    }
}
