//! Schema definition types
//!
//! Supported field types:
//! - string, number, boolean
//! - date (`YYYY-MM-DD`), datetime (`YYYY-MM-DDTHH:mm:ss`)
//! - url, uuid, email: strings with a format check
//! - object: nested field list
//! - array: elements described by `items`

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::errors::SchemaDefinitionError;

/// Closed set of field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Date,
    Datetime,
    Url,
    Uuid,
    Email,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Array,
        FieldType::Object,
        FieldType::Date,
        FieldType::Datetime,
        FieldType::Url,
        FieldType::Uuid,
        FieldType::Email,
    ];

    /// Returns the type name as written in schema definitions
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Url => "url",
            FieldType::Uuid => "uuid",
            FieldType::Email => "email",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.type_name() == name)
    }

    /// Only these types can identify a record
    pub fn can_be_primary(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Number | FieldType::Uuid)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Lower or upper bound of a number or date field.
///
/// Number fields carry numbers, date fields carry `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Date(String),
}

impl Bound {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Bound::Number(n) => Some(*n),
            Bound::Date(_) => None,
        }
    }

    pub fn as_date_str(&self) -> Option<&str> {
        match self {
            Bound::Date(s) => Some(s),
            Bound::Number(_) => None,
        }
    }
}

/// Optional, type-dependent constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
}

impl ValidationRules {
    pub fn length(min: Option<u64>, max: Option<u64>) -> Self {
        Self {
            min_length: min,
            max_length: max,
            ..Self::default()
        }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min: min.map(Bound::Number),
            max: max.map(Bound::Number),
            ..Self::default()
        }
    }

    pub fn date_range(min: Option<&str>, max: Option<&str>) -> Self {
        Self {
            min: min.map(|d| Bound::Date(d.to_string())),
            max: max.map(|d| Bound::Date(d.to_string())),
            ..Self::default()
        }
    }

    pub fn items(min: Option<u64>, max: Option<u64>) -> Self {
        Self {
            min_items: min,
            max_items: max,
            ..Self::default()
        }
    }
}

/// Element description of an array field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsDefinition {
    #[serde(rename = "type")]
    pub item_type: FieldType,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

impl ItemsDefinition {
    pub fn of(item_type: FieldType) -> Self {
        Self {
            item_type,
            enum_values: None,
        }
    }

    pub fn one_of(item_type: FieldType, values: Vec<Value>) -> Self {
        Self {
            item_type,
            enum_values: Some(values),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Flags written as `null` read as unset, same as an absent key.
fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// One field of a schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, deserialize_with = "null_as_false", skip_serializing_if = "is_false")]
    pub primary: bool,
    #[serde(default, deserialize_with = "null_as_false", skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDefinition>>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            primary: false,
            nullable: false,
            validation: None,
            default: None,
            items: None,
            fields: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_validation(mut self, rules: ValidationRules) -> Self {
        self.validation = Some(rules);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_items(mut self, items: ItemsDefinition) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Rules of this field, empty when none were declared
    pub fn rules(&self) -> ValidationRules {
        self.validation.clone().unwrap_or_default()
    }

    /// Nested fields of an object field
    pub fn nested_fields(&self) -> &[FieldDefinition] {
        self.fields.as_deref().unwrap_or(&[])
    }
}

/// An accepted schema definition.
///
/// Only produced by the definition validator, so it always has exactly one
/// top-level primary field of type string, number or uuid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaDefinition {
    fields: Vec<FieldDefinition>,
}

impl SchemaDefinition {
    /// Runs the definition validator over typed fields.
    pub fn try_new(fields: Vec<FieldDefinition>) -> Result<Self, SchemaDefinitionError> {
        let raw = serde_json::to_value(&fields)
            .map_err(|e| SchemaDefinitionError::malformed(e.to_string()))?;
        super::validator::validate_schema_definition(&raw)
    }

    pub(crate) fn from_checked(fields: Vec<FieldDefinition>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_field(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.primary)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_names_round_trip() {
        for t in FieldType::ALL {
            assert_eq!(FieldType::parse(t.type_name()), Some(t));
        }
        assert_eq!(FieldType::parse("int"), None);
        assert_eq!(FieldType::parse("String"), None);
    }

    #[test]
    fn test_primary_capable_types() {
        let capable: Vec<_> = FieldType::ALL
            .into_iter()
            .filter(|t| t.can_be_primary())
            .collect();
        assert_eq!(
            capable,
            vec![FieldType::String, FieldType::Number, FieldType::Uuid]
        );
    }

    #[test]
    fn test_field_definition_wire_format() {
        let field = FieldDefinition::new("tags", FieldType::Array)
            .with_validation(ValidationRules::items(Some(1), None))
            .with_items(ItemsDefinition::one_of(
                FieldType::String,
                vec![json!("a"), json!("b")],
            ));

        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "tags",
                "type": "array",
                "validation": {"minItems": 1},
                "items": {"type": "string", "enum": ["a", "b"]}
            })
        );
    }

    #[test]
    fn test_bound_untagged() {
        let rules: ValidationRules =
            serde_json::from_value(json!({"min": 3, "max": "2024-01-01"})).unwrap();
        assert_eq!(rules.min, Some(Bound::Number(3.0)));
        assert_eq!(rules.max, Some(Bound::Date("2024-01-01".into())));
    }

    #[test]
    fn test_try_new_finds_primary() {
        let schema = SchemaDefinition::try_new(vec![
            FieldDefinition::new("id", FieldType::Number).primary(),
            FieldDefinition::new("name", FieldType::String),
        ])
        .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.primary_field().unwrap().name, "id");
        assert!(schema.field("name").is_some());
        assert!(schema.field("missing").is_none());
    }
}
