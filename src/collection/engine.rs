//! # Record Collection Engine
//!
//! Create, read, update and delete over a schema-bound collection held as
//! a plain `Vec` of records. The engine never touches storage; callers load
//! the collection, apply one operation and save it back.
//!
//! Semantics:
//! - create is an upsert: a payload whose key matches an existing record
//!   updates that record instead
//! - a missing primary key is generated before validation
//! - after an insert only the most recent `tier_limit` records are kept,
//!   dropping from the front
//! - update is a shallow merge followed by full revalidation

use serde_json::Value;

use super::errors::{CollectionError, CollectionResult};
use super::primary_key::{generate_primary_key, key_matches, key_string, key_value_matches};
use super::query::{paginate, sort_records, ListQuery, Page, PageRequest};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::SchemaDefinition;
use crate::validation::{RecordValidator, UnknownKeys};

/// Operations over one schema's records
#[derive(Debug, Clone)]
pub struct RecordEngine {
    schema: SchemaDefinition,
    validator: RecordValidator,
    primary: String,
}

impl RecordEngine {
    /// Builds an engine for an accepted schema.
    ///
    /// # Errors
    ///
    /// `MissingPrimaryKey` if the schema has no primary field, or `Compile`
    /// if its validator cannot be built.
    pub fn new(schema: SchemaDefinition) -> CollectionResult<Self> {
        let primary = schema
            .primary_field()
            .map(|f| f.name.clone())
            .ok_or(CollectionError::MissingPrimaryKey)?;
        let validator = RecordValidator::compile(&schema)?;

        Ok(Self {
            schema,
            validator,
            primary,
        })
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.validator = self.validator.with_unknown_keys(policy);
        self
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Name of the primary field
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Inserts a record, or updates the record with the same key.
    pub fn upsert(
        &self,
        records: &mut Vec<Value>,
        payload: &Value,
        tier_limit: usize,
    ) -> CollectionResult<Value> {
        let Some(fields) = payload.as_object() else {
            return Err(CollectionError::InvalidPayload(
                "record must be a JSON object".to_string(),
            ));
        };

        // Keys match by JSON value here: a mistyped key goes down the create
        // path and fails validation there.
        if let Some(key) = fields.get(&self.primary).filter(|v| !v.is_null()) {
            if records
                .iter()
                .any(|r| key_value_matches(r, &self.primary, key))
            {
                return self.update(records, &key_string(key), payload);
            }
        }

        let mut candidate = fields.clone();
        if candidate.get(&self.primary).map_or(true, Value::is_null) {
            let key = generate_primary_key(&self.schema, records)?;
            candidate.insert(self.primary.clone(), key);
        }

        let record = self.check(&Value::Object(candidate))?;
        let key = record.get(&self.primary).map(key_string).unwrap_or_default();
        records.push(record.clone());

        log_event_with_fields(Event::RecordCreated, &[("primary_key", key.as_str())]);
        truncate_to_limit(records, tier_limit);

        Ok(record)
    }

    /// Returns the collection, sorted when the query names a declared field.
    ///
    /// Sorting by an undeclared field is ignored.
    pub fn list(&self, records: &[Value], query: &ListQuery) -> Vec<Value> {
        list_sorted(&self.schema, records, query)
    }

    /// Sorted listing cut to one page
    pub fn list_page(&self, records: &[Value], query: &ListQuery, page: PageRequest) -> Page {
        paginate(self.list(records, query), page)
    }

    pub fn get(&self, records: &[Value], key: &str) -> CollectionResult<Value> {
        records
            .iter()
            .find(|r| key_matches(r, &self.primary, key))
            .cloned()
            .ok_or_else(|| CollectionError::NotFound(key.to_string()))
    }

    /// Merges `patch` over the record with `key` and revalidates it.
    pub fn update(
        &self,
        records: &mut [Value],
        key: &str,
        patch: &Value,
    ) -> CollectionResult<Value> {
        let Some(patch) = patch.as_object() else {
            return Err(CollectionError::InvalidPayload(
                "patch must be a JSON object".to_string(),
            ));
        };

        let index = self.position(records, key)?;
        let mut merged = records[index].as_object().cloned().unwrap_or_default();
        for (field, value) in patch {
            merged.insert(field.clone(), value.clone());
        }

        let record = self.check(&Value::Object(merged))?;
        let new_key = record.get(&self.primary).map(key_string).unwrap_or_default();
        if new_key != key {
            let taken = records
                .iter()
                .enumerate()
                .any(|(i, r)| i != index && key_matches(r, &self.primary, &new_key));
            if taken {
                return Err(CollectionError::DuplicateKey(new_key));
            }
        }

        records[index] = record.clone();
        log_event_with_fields(Event::RecordUpdated, &[("primary_key", new_key.as_str())]);

        Ok(record)
    }

    /// Removes and returns the record with `key`.
    pub fn delete(&self, records: &mut Vec<Value>, key: &str) -> CollectionResult<Value> {
        let index = self.position(records, key)?;
        let removed = records.remove(index);
        log_event_with_fields(Event::RecordDeleted, &[("primary_key", key)]);
        Ok(removed)
    }

    fn position(&self, records: &[Value], key: &str) -> CollectionResult<usize> {
        records
            .iter()
            .position(|r| key_matches(r, &self.primary, key))
            .ok_or_else(|| CollectionError::NotFound(key.to_string()))
    }

    fn check(&self, candidate: &Value) -> CollectionResult<Value> {
        self.validator.validate(candidate).into_result().map_err(|errors| {
            log_event_with_fields(
                Event::RecordRejected,
                &[("errors", errors.len().to_string().as_str())],
            );
            CollectionError::Validation(errors)
        })
    }
}

/// Keeps the last `limit` records.
pub(crate) fn truncate_to_limit(records: &mut Vec<Value>, limit: usize) {
    if records.len() > limit {
        let dropped = records.len() - limit;
        records.drain(..dropped);
        log_event_with_fields(
            Event::CollectionTruncated,
            &[
                ("records_dropped", dropped.to_string().as_str()),
                ("limit", limit.to_string().as_str()),
            ],
        );
    }
}

fn list_sorted(schema: &SchemaDefinition, records: &[Value], query: &ListQuery) -> Vec<Value> {
    let mut out = records.to_vec();
    if let Some(field) = query.sort.as_deref() {
        if schema.field(field).is_some() {
            sort_records(&mut out, field, query.order);
        }
    }
    out
}

// ==================
// Free functions
// ==================

/// Creates or updates one record. See `RecordEngine::upsert`.
pub fn upsert_record(
    schema: &SchemaDefinition,
    collection: &mut Vec<Value>,
    payload: &Value,
    tier_limit: usize,
) -> CollectionResult<Value> {
    RecordEngine::new(schema.clone())?.upsert(collection, payload, tier_limit)
}

/// Returns the collection, optionally sorted.
pub fn list_records(
    schema: &SchemaDefinition,
    collection: &[Value],
    query: &ListQuery,
) -> Vec<Value> {
    list_sorted(schema, collection, query)
}

pub fn get_record_by_primary_key(
    schema: &SchemaDefinition,
    collection: &[Value],
    key: &str,
) -> CollectionResult<Value> {
    RecordEngine::new(schema.clone())?.get(collection, key)
}

pub fn update_record(
    schema: &SchemaDefinition,
    collection: &mut [Value],
    key: &str,
    patch: &Value,
) -> CollectionResult<Value> {
    RecordEngine::new(schema.clone())?.update(collection, key, patch)
}

pub fn delete_record(
    schema: &SchemaDefinition,
    collection: &mut Vec<Value>,
    key: &str,
) -> CollectionResult<Value> {
    RecordEngine::new(schema.clone())?.delete(collection, key)
}
