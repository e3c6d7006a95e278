//! Record validator
//!
//! Validation semantics:
//! - every declared field is checked independently of its siblings
//! - every failing constraint is reported, never just the first
//! - absent fields take their declared default before validation
//! - `nullable` admits `null`; nullable non-primary fields may be absent
//! - dates and datetimes are normalized to their canonical literal
//! - undeclared keys are dropped, or reported under `UnknownKeys::Reject`
//!
//! The input record is never mutated; a new record is built.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{CompileError, FieldError, ValidationErrorCode};
use super::formats;
use super::result::ValidationResult;
use super::spec::{FieldSpec, ItemSpec, SpecKind};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{FieldType, SchemaDefinition};
use crate::temporal::{self, DateKind};

/// Path reported when the record itself is not an object
pub const ROOT_PATH: &str = "$root";

/// Policy for keys a record carries but the schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeys {
    /// Silently drop them from the normalized record
    #[default]
    Strip,
    /// Report each one as an error
    Reject,
}

/// Validator compiled from one accepted schema.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    fields: Vec<FieldSpec>,
    unknown_keys: UnknownKeys,
}

impl RecordValidator {
    /// Compiles an accepted schema.
    ///
    /// # Errors
    ///
    /// Returns `CompileError` if a pattern or bound that the definition
    /// validator should have rejected is still malformed.
    pub fn compile(schema: &SchemaDefinition) -> Result<Self, CompileError> {
        let fields = FieldSpec::compile_all(schema.fields(), "").map_err(|e| {
            log_event_with_fields(
                Event::SchemaCompileFailed,
                &[("field", e.field()), ("reason", e.to_string().as_str())],
            );
            e
        })?;

        Ok(Self {
            fields,
            unknown_keys: UnknownKeys::default(),
        })
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.unknown_keys
    }

    /// Validates a candidate record and builds its normalized form.
    pub fn validate(&self, record: &Value) -> ValidationResult {
        let Some(obj) = record.as_object() else {
            return ValidationResult::failure(vec![FieldError::type_mismatch(
                ROOT_PATH,
                "object",
                json_type_name(record),
            )]);
        };

        let mut errors = Vec::new();
        let normalized = self.validate_object(obj, &self.fields, "", &mut errors);

        if errors.is_empty() {
            ValidationResult::success(Value::Object(normalized))
        } else {
            ValidationResult::failure(errors)
        }
    }

    fn validate_object(
        &self,
        obj: &Map<String, Value>,
        fields: &[FieldSpec],
        prefix: &str,
        errors: &mut Vec<FieldError>,
    ) -> Map<String, Value> {
        let mut out = Map::new();

        for spec in fields {
            let path = make_path(prefix, &spec.name);

            match obj.get(&spec.name).or(spec.default.as_ref()) {
                None => {
                    if !spec.nullable || spec.primary {
                        errors.push(FieldError::required(&path));
                    }
                }
                Some(Value::Null) if spec.nullable => {
                    out.insert(spec.name.clone(), Value::Null);
                }
                Some(Value::Null) => {
                    errors.push(FieldError::type_mismatch(
                        &path,
                        kind_name(&spec.kind),
                        "null",
                    ));
                }
                Some(value) => {
                    if let Some(normalized) = self.validate_value(value, &spec.kind, &path, errors)
                    {
                        out.insert(spec.name.clone(), normalized);
                    }
                }
            }
        }

        if self.unknown_keys == UnknownKeys::Reject {
            for key in obj.keys() {
                if !fields.iter().any(|f| &f.name == key) {
                    errors.push(FieldError::unrecognized_key(make_path(prefix, key)));
                }
            }
        }

        out
    }

    /// Returns the normalized value, or `None` after recording at least one
    /// error.
    fn validate_value(
        &self,
        value: &Value,
        kind: &SpecKind,
        path: &str,
        errors: &mut Vec<FieldError>,
    ) -> Option<Value> {
        let before = errors.len();

        let normalized = match kind {
            SpecKind::String {
                min_length,
                max_length,
                pattern,
            } => {
                let text = expect_str(value, "string", path, errors)?;
                let length = text.chars().count() as u64;
                if let Some(min) = min_length {
                    if length < *min {
                        errors.push(FieldError::too_small(
                            path,
                            format!("String must contain at least {} character(s)", min),
                        ));
                    }
                }
                if let Some(max) = max_length {
                    if length > *max {
                        errors.push(FieldError::too_big(
                            path,
                            format!("String must contain at most {} character(s)", max),
                        ));
                    }
                }
                if let Some(re) = pattern {
                    if !re.is_match(text) {
                        errors.push(FieldError::invalid_string(
                            path,
                            format!("String does not match pattern {}", re.as_str()),
                        ));
                    }
                }
                value.clone()
            }
            SpecKind::Number { min, max } => {
                let Some(number) = value.as_f64() else {
                    errors.push(FieldError::type_mismatch(
                        path,
                        "number",
                        json_type_name(value),
                    ));
                    return None;
                };
                if let Some(min) = min {
                    if number < *min {
                        errors.push(FieldError::too_small(
                            path,
                            format!("Number must be greater than or equal to {}", min),
                        ));
                    }
                }
                if let Some(max) = max {
                    if number > *max {
                        errors.push(FieldError::too_big(
                            path,
                            format!("Number must be less than or equal to {}", max),
                        ));
                    }
                }
                value.clone()
            }
            SpecKind::Boolean => {
                if !value.is_boolean() {
                    errors.push(FieldError::type_mismatch(
                        path,
                        "boolean",
                        json_type_name(value),
                    ));
                    return None;
                }
                value.clone()
            }
            SpecKind::Date { min, max } => {
                let text = expect_str(value, "date", path, errors)?;
                let Some(date) = temporal::parse_date(text) else {
                    errors.push(invalid_literal(path, DateKind::Date));
                    return None;
                };
                if let Some(min) = min {
                    if date < *min {
                        errors.push(FieldError::too_small(
                            path,
                            format!("Date must be on or after {}", temporal::format_date(*min)),
                        ));
                    }
                }
                if let Some(max) = max {
                    if date > *max {
                        errors.push(FieldError::too_big(
                            path,
                            format!("Date must be on or before {}", temporal::format_date(*max)),
                        ));
                    }
                }
                Value::String(temporal::format_date(date))
            }
            SpecKind::Datetime => {
                let text = expect_str(value, "datetime", path, errors)?;
                let Some(datetime) = temporal::parse_datetime(text) else {
                    errors.push(invalid_literal(path, DateKind::Datetime));
                    return None;
                };
                Value::String(temporal::format_datetime(datetime))
            }
            SpecKind::Email => check_format(value, "email", formats::is_email, path, errors)?,
            SpecKind::Url => check_format(value, "url", formats::is_url, path, errors)?,
            SpecKind::Uuid => check_format(value, "uuid", formats::is_uuid, path, errors)?,
            SpecKind::Array {
                items,
                min_items,
                max_items,
            } => {
                let Some(elements) = value.as_array() else {
                    errors.push(FieldError::type_mismatch(
                        path,
                        "array",
                        json_type_name(value),
                    ));
                    return None;
                };
                let mut out = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    let element_path = format!("{}.{}", path, index);
                    let checked = match items {
                        Some(items) => self.validate_item(element, items, &element_path, errors),
                        None => Some(element.clone()),
                    };
                    out.extend(checked);
                }
                let count = elements.len() as u64;
                if let Some(min) = min_items {
                    if count < *min {
                        errors.push(FieldError::too_small(
                            path,
                            format!("Array must contain at least {} element(s)", min),
                        ));
                    }
                }
                if let Some(max) = max_items {
                    if count > *max {
                        errors.push(FieldError::too_big(
                            path,
                            format!("Array must contain at most {} element(s)", max),
                        ));
                    }
                }
                Value::Array(out)
            }
            SpecKind::Object { fields } => {
                let Some(obj) = value.as_object() else {
                    errors.push(FieldError::type_mismatch(
                        path,
                        "object",
                        json_type_name(value),
                    ));
                    return None;
                };
                Value::Object(self.validate_object(obj, fields, path, errors))
            }
        };

        (errors.len() == before).then_some(normalized)
    }

    fn validate_item(
        &self,
        element: &Value,
        items: &ItemSpec,
        path: &str,
        errors: &mut Vec<FieldError>,
    ) -> Option<Value> {
        let normalized = match SpecKind::bare(items.item_type) {
            Some(kind) => self.validate_value(element, &kind, path, errors)?,
            None => {
                let kind_matches = match items.item_type {
                    FieldType::Object => element.is_object(),
                    _ => element.is_array(),
                };
                if !kind_matches {
                    errors.push(FieldError::type_mismatch(
                        path,
                        items.item_type.type_name(),
                        json_type_name(element),
                    ));
                    return None;
                }
                element.clone()
            }
        };

        if let Some(allowed) = &items.allowed {
            if !allowed.iter().any(|candidate| same_value(candidate, element)) {
                let expected: Vec<String> = allowed.iter().map(Value::to_string).collect();
                errors.push(FieldError::new(
                    path,
                    ValidationErrorCode::InvalidEnumValue,
                    format!(
                        "Invalid enum value. Expected {}, received {}",
                        expected.join(" | "),
                        element
                    ),
                ));
                return None;
            }
        }

        Some(normalized)
    }
}

fn expect_str<'a>(
    value: &'a Value,
    expected: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    let text = value.as_str();
    if text.is_none() {
        errors.push(FieldError::type_mismatch(path, expected, json_type_name(value)));
    }
    text
}

fn check_format(
    value: &Value,
    format_name: &str,
    check: fn(&str) -> bool,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let text = expect_str(value, "string", path, errors)?;
    if !check(text) {
        errors.push(FieldError::invalid_string(path, format!("Invalid {}", format_name)));
        return None;
    }
    Some(value.clone())
}

fn invalid_literal(path: &str, kind: DateKind) -> FieldError {
    FieldError::invalid_date(
        path,
        format!("Invalid {}, expected {}", kind_label(kind), kind.canonical()),
    )
}

fn kind_label(kind: DateKind) -> &'static str {
    match kind {
        DateKind::Date => "date",
        DateKind::Datetime => "datetime",
    }
}

/// Enum membership: numbers compare by value so `1` matches `1.0`
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn kind_name(kind: &SpecKind) -> &'static str {
    match kind {
        SpecKind::String { .. } => "string",
        SpecKind::Number { .. } => "number",
        SpecKind::Boolean => "boolean",
        SpecKind::Date { .. } => "date",
        SpecKind::Datetime => "datetime",
        SpecKind::Email => "email",
        SpecKind::Url => "url",
        SpecKind::Uuid => "uuid",
        SpecKind::Array { .. } => "array",
        SpecKind::Object { .. } => "object",
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_schema_definition;
    use serde_json::json;

    fn validator(raw: Value) -> RecordValidator {
        let schema = validate_schema_definition(&raw).unwrap();
        RecordValidator::compile(&schema).unwrap()
    }

    fn users() -> RecordValidator {
        validator(json!([
            {"name": "id", "type": "number", "primary": true},
            {"name": "name", "type": "string", "validation": {"minLength": 2, "maxLength": 5, "pattern": "^[a-z]+$"}},
            {"name": "age", "type": "number", "nullable": true, "validation": {"min": 0, "max": 150}},
            {"name": "active", "type": "boolean", "default": true}
        ]))
    }

    #[test]
    fn test_valid_record_passes() {
        let result = users().validate(&json!({"id": 1, "name": "ada", "age": 36}));
        assert!(result.is_valid);
        assert_eq!(
            result.data.unwrap(),
            json!({"id": 1, "name": "ada", "age": 36, "active": true})
        );
    }

    #[test]
    fn test_every_failing_constraint_reported() {
        let result = users().validate(&json!({"id": 1, "name": "ABCDEFG", "age": -1}));
        assert!(!result.is_valid);
        assert!(result.data.is_none());

        let codes: Vec<_> = result.errors.iter().map(|e| (e.field.as_str(), e.code)).collect();
        assert_eq!(
            codes,
            vec![
                ("name", ValidationErrorCode::TooBig),
                ("name", ValidationErrorCode::InvalidString),
                ("age", ValidationErrorCode::TooSmall),
            ]
        );
    }

    #[test]
    fn test_missing_required_field() {
        let result = users().validate(&json!({"id": 1}));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "name");
        assert_eq!(result.errors[0].code, ValidationErrorCode::Required);
    }

    #[test]
    fn test_nullable_accepts_null_and_absence() {
        let v = users();
        assert!(v.validate(&json!({"id": 1, "name": "ab", "age": null})).is_valid);
        let absent = v.validate(&json!({"id": 1, "name": "ab"}));
        assert!(absent.is_valid);
        assert!(absent.data.unwrap().get("age").is_none());
    }

    #[test]
    fn test_null_on_non_nullable_is_type_error() {
        let result = users().validate(&json!({"id": 1, "name": null}));
        assert_eq!(result.errors[0].code, ValidationErrorCode::InvalidType);
        assert_eq!(result.errors[0].message, "Expected string, received null");
    }

    #[test]
    fn test_nullable_primary_still_required() {
        let v = validator(json!([
            {"name": "id", "type": "string", "primary": true, "nullable": true}
        ]));
        assert!(!v.validate(&json!({})).is_valid);
        assert!(v.validate(&json!({"id": null})).is_valid);
    }

    #[test]
    fn test_root_must_be_object() {
        let result = users().validate(&json!([1, 2]));
        assert_eq!(result.errors[0].field, ROOT_PATH);
    }

    #[test]
    fn test_unknown_keys_stripped_by_default() {
        let result = users().validate(&json!({"id": 1, "name": "ab", "extra": 1}));
        assert!(result.is_valid);
        assert!(result.data.unwrap().get("extra").is_none());
    }

    #[test]
    fn test_unknown_keys_rejected_when_configured() {
        let v = users().with_unknown_keys(UnknownKeys::Reject);
        let result = v.validate(&json!({"id": 1, "name": "ab", "extra": 1}));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].code, ValidationErrorCode::UnrecognizedKeys);
        assert_eq!(result.errors[0].field, "extra");
    }

    #[test]
    fn test_date_bounds_and_normalization() {
        let v = validator(json!([
            {"name": "id", "type": "uuid", "primary": true},
            {"name": "born", "type": "date", "validation": {"min": "2000-01-01", "max": "2000-12-31"}}
        ]));
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";

        assert!(v.validate(&json!({"id": id, "born": "2000-01-01"})).is_valid);
        assert!(v.validate(&json!({"id": id, "born": "2000-12-31"})).is_valid);

        let early = v.validate(&json!({"id": id, "born": "1999-12-31"}));
        assert_eq!(early.errors[0].code, ValidationErrorCode::TooSmall);

        let loose = v.validate(&json!({"id": id, "born": "2000-1-5"}));
        assert_eq!(loose.errors[0].code, ValidationErrorCode::InvalidDate);
    }

    #[test]
    fn test_array_items_and_enum() {
        let v = validator(json!([
            {"name": "id", "type": "number", "primary": true},
            {"name": "tags", "type": "array", "validation": {"minItems": 1, "maxItems": 2},
             "items": {"type": "string", "enum": ["red", "blue"]}}
        ]));

        assert!(v.validate(&json!({"id": 1, "tags": ["red"]})).is_valid);

        let result = v.validate(&json!({"id": 1, "tags": ["red", "green", 3]}));
        let fields: Vec<_> = result.errors.iter().map(|e| (e.field.as_str(), e.code)).collect();
        assert_eq!(
            fields,
            vec![
                ("tags.1", ValidationErrorCode::InvalidEnumValue),
                ("tags.2", ValidationErrorCode::InvalidType),
                ("tags", ValidationErrorCode::TooBig),
            ]
        );
    }

    #[test]
    fn test_nested_object_paths() {
        let v = validator(json!([
            {"name": "id", "type": "number", "primary": true},
            {"name": "address", "type": "object", "fields": [
                {"name": "city", "type": "string"},
                {"name": "zip", "type": "string", "validation": {"pattern": "^[0-9]{5}$"}}
            ]}
        ]));

        let result = v.validate(&json!({"id": 1, "address": {"zip": "abc", "note": "x"}}));
        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["address.city", "address.zip"]);

        let ok = v.validate(&json!({"id": 1, "address": {"city": "Oslo", "zip": "01234", "note": "x"}}));
        assert_eq!(
            ok.data.unwrap()["address"],
            json!({"city": "Oslo", "zip": "01234"})
        );
    }

    #[test]
    fn test_format_types() {
        let v = validator(json!([
            {"name": "id", "type": "string", "primary": true},
            {"name": "mail", "type": "email"},
            {"name": "site", "type": "url"},
            {"name": "ref", "type": "uuid"}
        ]));
        let result = v.validate(&json!({"id": "a", "mail": "nope", "site": "nope", "ref": "nope"}));
        assert_eq!(result.errors.len(), 3);
        assert!(result
            .errors
            .iter()
            .all(|e| e.code == ValidationErrorCode::InvalidString));
    }

    #[test]
    fn test_input_not_mutated() {
        let record = json!({"id": 1, "name": "ab", "extra": true});
        let copy = record.clone();
        let _ = users().validate(&record);
        assert_eq!(record, copy);
    }
}
