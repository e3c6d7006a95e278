//! Schema definition validator
//!
//! Checks an untyped JSON definition before anything trusts it. Rules run in
//! this order for every field list:
//!
//! 1. name is non-empty and purely alphabetic
//! 2. type belongs to the closed enumeration
//! 3. exactly one top-level primary, of type string, number or uuid
//! 4. no duplicate names (reported together)
//! 5. validation keys match the field type
//! 6. lower bounds do not exceed upper bounds
//! 7. `pattern` compiles
//! 8. `items.enum` values match `items.type`
//! 9. the list is not empty
//! 10. object fields recurse into `fields`, array fields check `items`
//!
//! Every violation is recorded. The top-level message belongs to the first
//! violation of the earliest rule.

use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

use super::errors::{SchemaDefinitionError, SchemaErrorCode, SchemaIssue, SchemaResult};
use super::types::{FieldDefinition, FieldType, SchemaDefinition};
use crate::observability::{log_event_with_fields, Event};
use crate::temporal;

/// Validates a raw definition and returns the accepted schema.
pub fn validate_schema_definition(raw: &Value) -> SchemaResult<SchemaDefinition> {
    let result = check_definition(raw);

    match &result {
        Ok(schema) => {
            let field_count = schema.len().to_string();
            let primary = schema
                .primary_field()
                .map(|f| f.name.as_str())
                .unwrap_or_default();
            log_event_with_fields(
                Event::SchemaAccepted,
                &[("fields", field_count.as_str()), ("primary", primary)],
            );
        }
        Err(err) => {
            let issue_count = err.issues().len().to_string();
            log_event_with_fields(
                Event::SchemaRejected,
                &[
                    ("code", err.code().code()),
                    ("issues", issue_count.as_str()),
                    ("message", err.message()),
                ],
            );
        }
    }

    result
}

fn check_definition(raw: &Value) -> SchemaResult<SchemaDefinition> {
    let fields = raw.as_array().ok_or_else(|| {
        SchemaDefinitionError::malformed("expected an array of field definitions")
    })?;

    let mut checker = DefinitionChecker::default();
    checker.check_field_list(fields, "");
    checker.check_primary(fields);

    if !checker.issues.is_empty() {
        return Err(SchemaDefinitionError::from_issues(checker.issues));
    }

    let typed: Vec<FieldDefinition> = serde_json::from_value(raw.clone())
        .map_err(|e| SchemaDefinitionError::malformed(e.to_string()))?;

    Ok(SchemaDefinition::from_checked(typed))
}

#[derive(Default)]
struct DefinitionChecker {
    issues: Vec<SchemaIssue>,
}

impl DefinitionChecker {
    fn push(&mut self, path: &str, code: SchemaErrorCode, message: impl Into<String>) {
        self.issues.push(SchemaIssue::new(path, code, message));
    }

    fn check_field_list(&mut self, fields: &[Value], prefix: &str) {
        if fields.is_empty() {
            let message = if prefix.is_empty() {
                "Schema must contain at least one field".to_string()
            } else {
                format!("Object field '{}' must declare at least one nested field", prefix)
            };
            self.push(prefix, SchemaErrorCode::EmptySchema, message);
            return;
        }

        for (index, raw) in fields.iter().enumerate() {
            match raw.as_object() {
                Some(obj) => self.check_field(obj, index, prefix),
                None => self.push(
                    &make_path(prefix, &format!("#{}", index)),
                    SchemaErrorCode::InvalidStructure,
                    format!("Field at position {} must be an object", index),
                ),
            }
        }

        self.check_duplicates(fields, prefix);
    }

    fn check_field(&mut self, obj: &Map<String, Value>, index: usize, prefix: &str) {
        let name = obj.get("name").and_then(Value::as_str).unwrap_or_default();
        let label = if name.is_empty() {
            format!("#{}", index)
        } else {
            name.to_string()
        };
        let path = make_path(prefix, &label);

        if name.is_empty() {
            self.push(
                &path,
                SchemaErrorCode::InvalidFieldName,
                format!("Field at position {} must have a non-empty name", index),
            );
        } else if !is_valid_field_name(name) {
            self.push(
                &path,
                SchemaErrorCode::InvalidFieldName,
                format!("Field name '{}' must contain only letters (a-z, A-Z)", name),
            );
        }

        for flag in ["primary", "nullable"] {
            if present(obj, flag).is_some_and(|v| !v.is_boolean()) {
                self.push(
                    &path,
                    SchemaErrorCode::InvalidStructure,
                    format!("'{}' of field '{}' must be a boolean", flag, label),
                );
            }
        }

        let Some(field_type) = parse_type(obj.get("type")) else {
            self.push(
                &path,
                SchemaErrorCode::InvalidFieldType,
                format!(
                    "Field '{}' has invalid type {}. Expected one of: {}",
                    label,
                    describe(obj.get("type")),
                    type_list()
                ),
            );
            return;
        };

        if !prefix.is_empty() && is_primary(obj) {
            self.push(
                &path,
                SchemaErrorCode::PrimaryKey,
                format!("Primary field '{}' must be declared at the top level", label),
            );
        }

        if let Some(validation) = present(obj, "validation") {
            match validation.as_object() {
                Some(rules) => self.check_rules(rules, field_type, &path, &label),
                None => self.push(
                    &path,
                    SchemaErrorCode::InvalidStructure,
                    format!("Validation rules of field '{}' must be an object", label),
                ),
            }
        }

        self.check_items(present(obj, "items"), field_type, &path, &label);

        match (present(obj, "fields"), field_type) {
            (Some(Value::Array(nested)), FieldType::Object) => {
                self.check_field_list(nested, &path)
            }
            (Some(_), FieldType::Object) => self.push(
                &path,
                SchemaErrorCode::InvalidStructure,
                format!("Nested fields of '{}' must be an array", label),
            ),
            (None, FieldType::Object) => self.check_field_list(&[], &path),
            (Some(_), other) => self.push(
                &path,
                SchemaErrorCode::MisplacedStructure,
                format!(
                    "'fields' is only allowed on object fields (field '{}' is {})",
                    label, other
                ),
            ),
            (None, _) => {}
        }
    }

    fn check_rules(
        &mut self,
        rules: &Map<String, Value>,
        field_type: FieldType,
        path: &str,
        label: &str,
    ) {
        for key in rules.iter().filter(|(_, v)| !v.is_null()).map(|(k, _)| k) {
            let allowed = match key.as_str() {
                "minLength" | "maxLength" | "pattern" => Some(field_type == FieldType::String),
                "min" | "max" => Some(matches!(field_type, FieldType::Number | FieldType::Date)),
                "minItems" | "maxItems" => Some(field_type == FieldType::Array),
                _ => None,
            };
            match allowed {
                Some(true) => {}
                Some(false) => self.push(
                    path,
                    SchemaErrorCode::MisplacedRule,
                    format!(
                        "Validation rule '{}' is not allowed on {} field '{}'",
                        key, field_type, label
                    ),
                ),
                None => self.push(
                    path,
                    SchemaErrorCode::MisplacedRule,
                    format!("Unknown validation rule '{}' on field '{}'", key, label),
                ),
            }
        }

        match field_type {
            FieldType::String => {
                self.check_count_pair(rules, ("minLength", "maxLength"), path, label);
                self.check_pattern(rules, path, label);
            }
            FieldType::Number => self.check_number_pair(rules, path, label),
            FieldType::Date => self.check_date_pair(rules, path, label),
            FieldType::Array => self.check_count_pair(rules, ("minItems", "maxItems"), path, label),
            _ => {}
        }
    }

    fn check_count_pair(
        &mut self,
        rules: &Map<String, Value>,
        (lo_key, hi_key): (&str, &str),
        path: &str,
        label: &str,
    ) {
        let lo = self.count_rule(rules, lo_key, path, label);
        let hi = self.count_rule(rules, hi_key, path, label);
        if let (Some(lo), Some(hi)) = (lo, hi) {
            if lo > hi {
                self.push(
                    path,
                    SchemaErrorCode::InvalidRange,
                    format!(
                        "'{}' ({}) cannot be greater than '{}' ({}) on field '{}'",
                        lo_key, lo, hi_key, hi, label
                    ),
                );
            }
        }
    }

    fn count_rule(
        &mut self,
        rules: &Map<String, Value>,
        key: &str,
        path: &str,
        label: &str,
    ) -> Option<u64> {
        let value = present(rules, key)?;
        let count = value.as_u64();
        if count.is_none() {
            self.push(
                path,
                SchemaErrorCode::InvalidRange,
                format!("'{}' of field '{}' must be a non-negative integer", key, label),
            );
        }
        count
    }

    fn check_number_pair(&mut self, rules: &Map<String, Value>, path: &str, label: &str) {
        let bound = |checker: &mut Self, key: &str| -> Option<f64> {
            let value = present(rules, key)?;
            let number = value.as_f64();
            if number.is_none() {
                checker.push(
                    path,
                    SchemaErrorCode::InvalidRange,
                    format!("'{}' of number field '{}' must be a number", key, label),
                );
            }
            number
        };
        let lo = bound(self, "min");
        let hi = bound(self, "max");
        if let (Some(lo), Some(hi)) = (lo, hi) {
            if lo > hi {
                self.push(
                    path,
                    SchemaErrorCode::InvalidRange,
                    format!(
                        "'min' ({}) cannot be greater than 'max' ({}) on field '{}'",
                        lo, hi, label
                    ),
                );
            }
        }
    }

    fn check_date_pair(&mut self, rules: &Map<String, Value>, path: &str, label: &str) {
        let bound = |checker: &mut Self, key: &str| -> Option<NaiveDate> {
            let value = present(rules, key)?;
            let date = value.as_str().and_then(temporal::parse_date);
            if date.is_none() {
                checker.push(
                    path,
                    SchemaErrorCode::InvalidRange,
                    format!(
                        "'{}' of date field '{}' must be a valid date ({})",
                        key,
                        label,
                        temporal::DateKind::Date.canonical()
                    ),
                );
            }
            date
        };
        let lo = bound(self, "min");
        let hi = bound(self, "max");
        if let (Some(lo), Some(hi)) = (lo, hi) {
            if lo > hi {
                self.push(
                    path,
                    SchemaErrorCode::InvalidRange,
                    format!(
                        "'min' ({}) cannot be after 'max' ({}) on field '{}'",
                        temporal::format_date(lo),
                        temporal::format_date(hi),
                        label
                    ),
                );
            }
        }
    }

    fn check_pattern(&mut self, rules: &Map<String, Value>, path: &str, label: &str) {
        let Some(pattern) = present(rules, "pattern") else {
            return;
        };
        match pattern.as_str() {
            Some(pattern) => {
                if let Err(e) = Regex::new(pattern) {
                    self.push(
                        path,
                        SchemaErrorCode::InvalidPattern,
                        format!("Invalid regex pattern for field '{}': {}", label, e),
                    );
                }
            }
            None => self.push(
                path,
                SchemaErrorCode::InvalidPattern,
                format!("Pattern of field '{}' must be a string", label),
            ),
        }
    }

    fn check_items(
        &mut self,
        items: Option<&Value>,
        field_type: FieldType,
        path: &str,
        label: &str,
    ) {
        let Some(items) = items else {
            return;
        };
        if field_type != FieldType::Array {
            self.push(
                path,
                SchemaErrorCode::MisplacedStructure,
                format!(
                    "'items' is only allowed on array fields (field '{}' is {})",
                    label, field_type
                ),
            );
            return;
        }

        let items_path = format!("{}.items", path);
        let Some(items) = items.as_object() else {
            self.push(
                &items_path,
                SchemaErrorCode::InvalidStructure,
                format!("Items of field '{}' must be an object", label),
            );
            return;
        };

        let Some(item_type) = parse_type(items.get("type")) else {
            self.push(
                &items_path,
                SchemaErrorCode::InvalidFieldType,
                format!(
                    "Items of field '{}' have invalid type {}. Expected one of: {}",
                    label,
                    describe(items.get("type")),
                    type_list()
                ),
            );
            return;
        };

        let Some(values) = present(items, "enum") else {
            return;
        };
        let Some(values) = values.as_array() else {
            self.push(
                &items_path,
                SchemaErrorCode::InvalidEnum,
                format!("Enum of field '{}' must be an array", label),
            );
            return;
        };
        let mismatched: Vec<String> = values
            .iter()
            .filter(|v| !enum_value_matches(item_type, v))
            .map(Value::to_string)
            .collect();
        if !mismatched.is_empty() {
            self.push(
                &items_path,
                SchemaErrorCode::InvalidEnum,
                format!(
                    "Enum values [{}] of field '{}' do not match item type {}",
                    mismatched.join(", "),
                    label,
                    item_type
                ),
            );
        }
    }

    fn check_duplicates(&mut self, fields: &[Value], prefix: &str) {
        let mut seen = HashSet::new();
        let mut duplicates: Vec<&str> = Vec::new();
        for name in fields
            .iter()
            .filter_map(|f| f.get("name").and_then(Value::as_str))
            .filter(|n| !n.is_empty())
        {
            if !seen.insert(name) && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        if !duplicates.is_empty() {
            self.push(
                prefix,
                SchemaErrorCode::DuplicateField,
                format!("Duplicate field names: {}", duplicates.join(", ")),
            );
        }
    }

    /// Top-level list only: nested primaries are reported by `check_field`.
    fn check_primary(&mut self, fields: &[Value]) {
        let primaries: Vec<&Map<String, Value>> = fields
            .iter()
            .filter_map(Value::as_object)
            .filter(|f| is_primary(f))
            .collect();

        match primaries.as_slice() {
            [] => self.push(
                "",
                SchemaErrorCode::PrimaryKey,
                "Schema must have exactly one primary field",
            ),
            [field] => {
                let name = field.get("name").and_then(Value::as_str).unwrap_or_default();
                if let Some(field_type) = parse_type(field.get("type")) {
                    if !field_type.can_be_primary() {
                        self.push(
                            name,
                            SchemaErrorCode::PrimaryKey,
                            format!(
                                "Primary field '{}' must be of type string, number, or uuid (got {})",
                                name, field_type
                            ),
                        );
                    }
                }
            }
            many => {
                let names: Vec<&str> = many
                    .iter()
                    .map(|f| f.get("name").and_then(Value::as_str).unwrap_or("?"))
                    .collect();
                self.push(
                    "",
                    SchemaErrorCode::PrimaryKey,
                    format!(
                        "Only one field can be primary, found {}: {}",
                        many.len(),
                        names.join(", ")
                    ),
                );
            }
        }
    }
}

/// Values allowed in `items.enum` for each item type
fn enum_value_matches(item_type: FieldType, value: &Value) -> bool {
    match item_type {
        FieldType::String | FieldType::Url | FieldType::Uuid | FieldType::Email => {
            value.is_string()
        }
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Date | FieldType::Datetime => value.is_string(),
        FieldType::Array => value.is_array(),
        FieldType::Object => value.is_object(),
    }
}

fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_primary(obj: &Map<String, Value>) -> bool {
    obj.get("primary").and_then(Value::as_bool).unwrap_or(false)
}

/// Key lookup that treats explicit `null` as absent
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn parse_type(value: Option<&Value>) -> Option<FieldType> {
    value.and_then(Value::as_str).and_then(FieldType::parse)
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "(missing)".to_string(),
        Some(v) => v.to_string(),
    }
}

fn type_list() -> String {
    FieldType::ALL
        .iter()
        .map(FieldType::type_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
