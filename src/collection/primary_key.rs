//! Primary key generation and matching

use rand::Rng;
use serde_json::{json, Value};
use uuid::{Builder, Uuid};

use super::errors::{CollectionError, CollectionResult};
use crate::schema::{FieldType, SchemaDefinition};

/// Generates a key for a new record.
///
/// - `string` and `uuid`: random v4 UUID string
/// - `number`: one above the highest numeric key in `existing`, where
///   absent or non-numeric keys count as 0
///
/// # Errors
///
/// `MissingPrimaryKey` for a schema with no primary field and
/// `UnsupportedPrimaryType` for any other primary type.
pub fn generate_primary_key(
    schema: &SchemaDefinition,
    existing: &[Value],
) -> CollectionResult<Value> {
    generate_primary_key_with(schema, existing, &mut rand::thread_rng())
}

/// Same as `generate_primary_key`, drawing UUID bytes from `rng`.
pub fn generate_primary_key_with<R: Rng + ?Sized>(
    schema: &SchemaDefinition,
    existing: &[Value],
    rng: &mut R,
) -> CollectionResult<Value> {
    let primary = schema
        .primary_field()
        .ok_or(CollectionError::MissingPrimaryKey)?;

    match primary.field_type {
        FieldType::String | FieldType::Uuid => Ok(Value::String(random_uuid(rng).to_string())),
        FieldType::Number => {
            let highest = existing
                .iter()
                .filter_map(|record| record.get(&primary.name).and_then(Value::as_f64))
                .fold(0.0_f64, f64::max);
            Ok(json!(highest.floor() as i64 + 1))
        }
        other => Err(CollectionError::UnsupportedPrimaryType(other)),
    }
}

/// v4 UUID built from `rng` so seeded generators stay reproducible
pub(crate) fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    Builder::from_random_bytes(bytes).into_uuid()
}

/// Text form of a key value: strings as-is, everything else as JSON text.
pub fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether `record`'s primary value matches `key`.
///
/// Numbers compare by their string form, so `"5"` matches `5`.
pub fn key_matches(record: &Value, primary: &str, key: &str) -> bool {
    match record.get(primary) {
        None | Some(Value::Null) => false,
        Some(value) => key_string(value) == key,
    }
}

/// Whether `record`'s primary value equals `key` as a JSON value.
///
/// Used where the caller holds a typed key, so `"5"` does not match `5`.
/// Numbers compare by value, so `5` matches `5.0`.
pub fn key_value_matches(record: &Value, primary: &str, key: &Value) -> bool {
    match (record.get(primary), key) {
        (None | Some(Value::Null), _) => false,
        (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Some(value), key) => value == key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_schema_definition;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn schema_with_primary(field_type: &str) -> SchemaDefinition {
        validate_schema_definition(&json!([
            {"name": "id", "type": field_type, "primary": true}
        ]))
        .unwrap()
    }

    #[test]
    fn test_numeric_key_is_highest_plus_one() {
        let schema = schema_with_primary("number");
        let existing = vec![json!({"id": 3}), json!({"id": 7}), json!({"id": 2})];
        assert_eq!(generate_primary_key(&schema, &existing).unwrap(), json!(8));
    }

    #[test]
    fn test_numeric_key_ignores_missing_and_non_numeric() {
        let schema = schema_with_primary("number");
        assert_eq!(generate_primary_key(&schema, &[]).unwrap(), json!(1));

        let existing = vec![json!({"id": "x"}), json!({}), json!({"id": null})];
        assert_eq!(generate_primary_key(&schema, &existing).unwrap(), json!(1));
    }

    #[test]
    fn test_string_and_uuid_keys_are_uuids() {
        for field_type in ["string", "uuid"] {
            let key = generate_primary_key(&schema_with_primary(field_type), &[]).unwrap();
            let text = key.as_str().unwrap();
            assert_eq!(Uuid::parse_str(text).unwrap().get_version_num(), 4);
        }
    }

    #[test]
    fn test_seeded_keys_repeat() {
        let schema = schema_with_primary("uuid");
        let a = generate_primary_key_with(&schema, &[], &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate_primary_key_with(&schema, &[], &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_matching() {
        assert!(key_matches(&json!({"id": 5}), "id", "5"));
        assert!(key_matches(&json!({"id": "abc"}), "id", "abc"));
        assert!(!key_matches(&json!({"id": 5}), "id", "6"));
        assert!(!key_matches(&json!({"id": null}), "id", "null"));
        assert!(!key_matches(&json!({}), "id", "5"));
    }

    #[test]
    fn test_key_value_matching_is_typed() {
        assert!(key_value_matches(&json!({"id": 5}), "id", &json!(5)));
        assert!(key_value_matches(&json!({"id": 5}), "id", &json!(5.0)));
        assert!(!key_value_matches(&json!({"id": 5}), "id", &json!("5")));
        assert!(!key_value_matches(&json!({"id": null}), "id", &Value::Null));
    }
}
