//! The compiled document

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

use crate::error::IrError;
use crate::options::DefaultValue;
use crate::types::{EnumType, Field, FieldKind, ObjectType, ScalarType};

/// Object types and enums in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    object_types: Vec<ObjectType>,
    enum_types: Vec<EnumType>,
}

impl Document {
    /// Build a document, checking name uniqueness, field classification,
    /// constraint columns and default values.
    pub fn new(object_types: Vec<ObjectType>, enum_types: Vec<EnumType>) -> Result<Self, IrError> {
        let document = Self {
            object_types,
            enum_types,
        };
        document.validate()?;

        debug!(
            object_types = document.object_types.len(),
            enum_types = document.enum_types.len(),
            "Built document"
        );
        Ok(document)
    }

    pub fn object_types(&self) -> &[ObjectType] {
        &self.object_types
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.object_types.iter().find(|t| t.name() == name)
    }

    pub fn enum_types(&self) -> &[EnumType] {
        &self.enum_types
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enum_types.iter().find(|t| t.name() == name)
    }

    /// Calculate fingerprint (SHA-256) of the canonical JSON form
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("IR should always serialize");
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn validate(&self) -> Result<(), IrError> {
        let mut type_names = HashSet::new();
        let declared = self
            .object_types
            .iter()
            .map(ObjectType::name)
            .chain(self.enum_types.iter().map(EnumType::name));
        for name in declared {
            if !type_names.insert(name) {
                return Err(IrError::DuplicateType(name.to_string()));
            }
        }

        for enum_type in &self.enum_types {
            let mut values = HashSet::new();
            for value in enum_type.values() {
                if !values.insert(value.as_str()) {
                    return Err(IrError::DuplicateEnumValue {
                        enum_type: enum_type.name().to_string(),
                        value: value.clone(),
                    });
                }
            }
        }

        for object_type in &self.object_types {
            let mut field_names = HashSet::new();
            for field in object_type.fields() {
                if !field_names.insert(field.name()) {
                    return Err(IrError::DuplicateField {
                        object_type: object_type.name().to_string(),
                        field: field.name().to_string(),
                    });
                }
                self.check_kind(object_type, field)?;
                if let Some(value) = field.default_value() {
                    self.check_default(object_type, field, value)?;
                }
            }
            check_constraint_fields(object_type)?;
        }

        Ok(())
    }

    fn check_kind(&self, object_type: &ObjectType, field: &Field) -> Result<(), IrError> {
        let known = match field.kind() {
            FieldKind::Scalar(scalar) => scalar.name() == field.type_name(),
            FieldKind::Enum => self.enum_type(field.type_name()).is_some(),
            FieldKind::Relation => self.object_type(field.type_name()).is_some(),
        };

        if known {
            Ok(())
        } else {
            Err(IrError::UnknownType {
                object_type: object_type.name().to_string(),
                field: field.name().to_string(),
                type_name: field.type_name().to_string(),
            })
        }
    }

    fn check_default(
        &self,
        object_type: &ObjectType,
        field: &Field,
        value: &DefaultValue,
    ) -> Result<(), IrError> {
        let invalid = |reason: String| IrError::InvalidDefaultValue {
            object_type: object_type.name().to_string(),
            field: field.name().to_string(),
            reason,
        };

        match (field.kind(), value) {
            (FieldKind::Relation, _) => Err(invalid("relation fields cannot have defaults".into())),
            (FieldKind::Scalar(ScalarType::ID), _) => {
                Err(invalid("ID fields are generated and cannot have defaults".into()))
            }
            (FieldKind::Scalar(ScalarType::String), DefaultValue::String(s)) => {
                if s.chars().count() > field.max_length() as usize {
                    Err(invalid(format!(
                        "default is longer than the maximum length {}",
                        field.max_length()
                    )))
                } else {
                    Ok(())
                }
            }
            (FieldKind::Scalar(ScalarType::Int), DefaultValue::Int(_)) => Ok(()),
            (FieldKind::Scalar(ScalarType::Float), DefaultValue::Int(_) | DefaultValue::Float(_)) => Ok(()),
            (FieldKind::Scalar(ScalarType::Boolean), DefaultValue::Boolean(_)) => Ok(()),
            (FieldKind::Scalar(ScalarType::DateTime), DefaultValue::String(s)) => {
                if is_datetime_literal(s) {
                    Ok(())
                } else {
                    Err(invalid(format!("{:?} is not an ISO-8601 date or datetime", s)))
                }
            }
            (FieldKind::Enum, DefaultValue::Enum(v) | DefaultValue::String(v)) => {
                match self.enum_type(field.type_name()) {
                    Some(enum_type) if enum_type.has_value(v) => Ok(()),
                    _ => Err(invalid(format!("{} is not a value of {}", v, field.type_name()))),
                }
            }
            (_, value) => Err(invalid(format!(
                "{} does not match type {}",
                value,
                field.type_name()
            ))),
        }
    }
}

fn check_constraint_fields(object_type: &ObjectType) -> Result<(), IrError> {
    let constraints = object_type
        .unique_constraints()
        .iter()
        .map(|c| (c.label(), &c.fields))
        .chain(
            object_type
                .indexes()
                .iter()
                .map(|i| (i.name.clone().unwrap_or_else(|| i.fields.join("_")), &i.fields)),
        );

    for (constraint, fields) in constraints {
        if fields.is_empty() {
            return Err(IrError::UnknownConstraintField {
                object_type: object_type.name().to_string(),
                constraint,
                field: String::new(),
            });
        }
        for name in fields {
            let column = object_type
                .field(name)
                .filter(|f| f.is_scalar() || f.is_enum());
            if column.is_none() {
                return Err(IrError::UnknownConstraintField {
                    object_type: object_type.name().to_string(),
                    constraint,
                    field: name.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Whether `s` is an ISO-8601 date or date-time, with or without an offset.
pub fn is_datetime_literal(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
