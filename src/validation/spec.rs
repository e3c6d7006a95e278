//! Compiled field specifications
//!
//! An accepted schema is lowered into a `FieldSpec` tree once: patterns are
//! compiled and date bounds parsed up front, so per-record validation is a
//! plain recursive walk.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use super::errors::CompileError;
use crate::schema::{Bound, FieldDefinition, FieldType, ItemsDefinition};
use crate::temporal;

#[derive(Debug, Clone)]
pub(crate) struct FieldSpec {
    pub name: String,
    pub primary: bool,
    pub nullable: bool,
    pub default: Option<Value>,
    pub kind: SpecKind,
}

#[derive(Debug, Clone)]
pub(crate) enum SpecKind {
    String {
        min_length: Option<u64>,
        max_length: Option<u64>,
        pattern: Option<Regex>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    Date {
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
    Datetime,
    Email,
    Url,
    Uuid,
    Array {
        items: Option<ItemSpec>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    Object {
        fields: Vec<FieldSpec>,
    },
}

/// Array element constraint: a bare type plus an optional allow-list
#[derive(Debug, Clone)]
pub(crate) struct ItemSpec {
    pub item_type: FieldType,
    pub allowed: Option<Vec<Value>>,
}

impl FieldSpec {
    pub fn compile_all(fields: &[FieldDefinition], prefix: &str) -> Result<Vec<Self>, CompileError> {
        fields
            .iter()
            .map(|field| Self::compile(field, prefix))
            .collect()
    }

    pub fn compile(field: &FieldDefinition, prefix: &str) -> Result<Self, CompileError> {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", prefix, field.name)
        };
        let rules = field.rules();

        let kind = match field.field_type {
            FieldType::String => SpecKind::String {
                min_length: rules.min_length,
                max_length: rules.max_length,
                pattern: rules
                    .pattern
                    .as_deref()
                    .map(|p| {
                        Regex::new(p).map_err(|e| CompileError::InvalidPattern {
                            field: path.clone(),
                            reason: e.to_string(),
                        })
                    })
                    .transpose()?,
            },
            FieldType::Number => SpecKind::Number {
                min: number_bound(rules.min.as_ref(), &path)?,
                max: number_bound(rules.max.as_ref(), &path)?,
            },
            FieldType::Boolean => SpecKind::Boolean,
            FieldType::Date => SpecKind::Date {
                min: date_bound(rules.min.as_ref(), &path)?,
                max: date_bound(rules.max.as_ref(), &path)?,
            },
            FieldType::Datetime => SpecKind::Datetime,
            FieldType::Email => SpecKind::Email,
            FieldType::Url => SpecKind::Url,
            FieldType::Uuid => SpecKind::Uuid,
            FieldType::Array => SpecKind::Array {
                items: field.items.as_ref().map(ItemSpec::from_definition),
                min_items: rules.min_items,
                max_items: rules.max_items,
            },
            FieldType::Object => SpecKind::Object {
                fields: Self::compile_all(field.nested_fields(), &path)?,
            },
        };

        Ok(Self {
            name: field.name.clone(),
            primary: field.primary,
            nullable: field.nullable,
            default: field.default.clone(),
            kind,
        })
    }
}

impl SpecKind {
    /// Constraint-free kind for scalar types, used for array elements.
    /// Arrays and objects have no bare form.
    pub fn bare(field_type: FieldType) -> Option<Self> {
        let kind = match field_type {
            FieldType::String => SpecKind::String {
                min_length: None,
                max_length: None,
                pattern: None,
            },
            FieldType::Number => SpecKind::Number {
                min: None,
                max: None,
            },
            FieldType::Boolean => SpecKind::Boolean,
            FieldType::Date => SpecKind::Date {
                min: None,
                max: None,
            },
            FieldType::Datetime => SpecKind::Datetime,
            FieldType::Email => SpecKind::Email,
            FieldType::Url => SpecKind::Url,
            FieldType::Uuid => SpecKind::Uuid,
            FieldType::Array | FieldType::Object => return None,
        };
        Some(kind)
    }
}

impl ItemSpec {
    fn from_definition(items: &ItemsDefinition) -> Self {
        Self {
            item_type: items.item_type,
            allowed: items.enum_values.clone(),
        }
    }
}

fn number_bound(bound: Option<&Bound>, path: &str) -> Result<Option<f64>, CompileError> {
    bound
        .map(|b| {
            b.as_number().ok_or_else(|| CompileError::InvalidNumberBound {
                field: path.to_string(),
            })
        })
        .transpose()
}

fn date_bound(bound: Option<&Bound>, path: &str) -> Result<Option<NaiveDate>, CompileError> {
    bound
        .map(|b| {
            b.as_date_str()
                .and_then(temporal::parse_date)
                .ok_or_else(|| CompileError::InvalidDateBound {
                    field: path.to_string(),
                    value: match b {
                        Bound::Date(s) => s.clone(),
                        Bound::Number(n) => n.to_string(),
                    },
                })
        })
        .transpose()
}
