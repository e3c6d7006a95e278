//! Store-backed collection handle
//!
//! Binds a schema id, an accepted schema and a `RecordStore`. Every
//! operation loads the whole collection, applies one engine call and saves
//! the result back.

use rand::Rng;
use serde_json::Value;

use super::engine::{truncate_to_limit, RecordEngine};
use super::errors::{CollectionResult, StoreError};
use super::query::{ListQuery, Page, PageRequest};
use super::store::RecordStore;
use crate::mock::MockGenerator;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::SchemaDefinition;
use crate::validation::UnknownKeys;

pub struct Collection<S: RecordStore> {
    id: String,
    engine: RecordEngine,
    store: S,
    tier_limit: usize,
}

impl<S: RecordStore> Collection<S> {
    pub fn new(
        id: impl Into<String>,
        schema: SchemaDefinition,
        store: S,
        tier_limit: usize,
    ) -> CollectionResult<Self> {
        Ok(Self {
            id: id.into(),
            engine: RecordEngine::new(schema)?,
            store,
            tier_limit,
        })
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.engine = self.engine.with_unknown_keys(policy);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schema(&self) -> &SchemaDefinition {
        self.engine.schema()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tier_limit(&self) -> usize {
        self.tier_limit
    }

    /// Every stored record in insertion order
    pub fn records(&self) -> CollectionResult<Vec<Value>> {
        Ok(self.load()?)
    }

    pub fn list(&self, query: &ListQuery, page: PageRequest) -> CollectionResult<Page> {
        let records = self.load()?;
        Ok(self.engine.list_page(&records, query, page))
    }

    pub fn get(&self, key: &str) -> CollectionResult<Value> {
        let records = self.load()?;
        self.engine.get(&records, key)
    }

    /// Creates a record, or updates the one with the same key.
    pub fn create(&mut self, payload: &Value) -> CollectionResult<Value> {
        let mut records = self.load()?;
        let record = self.engine.upsert(&mut records, payload, self.tier_limit)?;
        self.save(&records)?;
        Ok(record)
    }

    pub fn update(&mut self, key: &str, patch: &Value) -> CollectionResult<Value> {
        let mut records = self.load()?;
        let record = self.engine.update(&mut records, key, patch)?;
        self.save(&records)?;
        Ok(record)
    }

    pub fn delete(&mut self, key: &str) -> CollectionResult<Value> {
        let mut records = self.load()?;
        let removed = self.engine.delete(&mut records, key)?;
        self.save(&records)?;
        Ok(removed)
    }

    /// Fills an empty collection with one mock batch.
    ///
    /// Returns the inserted records; a non-empty collection is left as is
    /// and yields an empty list.
    pub fn seed<R: Rng>(&mut self, generator: &mut MockGenerator<R>) -> CollectionResult<Vec<Value>> {
        let existing = self.load()?;
        if !existing.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch = generator.generate_batch(self.engine.schema())?;
        truncate_to_limit(&mut batch, self.tier_limit);
        self.save(&batch)?;

        log_event_with_fields(
            Event::CollectionSeeded,
            &[
                ("collection", self.id.as_str()),
                ("records", batch.len().to_string().as_str()),
            ],
        );
        Ok(batch)
    }

    /// Drops every record.
    pub fn clear(&mut self) -> CollectionResult<()> {
        let id = self.id.clone();
        self.store
            .remove(&id)
            .map_err(|e| store_failed(&id, e))?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<Value>, StoreError> {
        self.store.load(&self.id).map_err(|e| store_failed(&self.id, e))
    }

    fn save(&mut self, records: &[Value]) -> Result<(), StoreError> {
        let id = self.id.clone();
        self.store
            .save(&id, records)
            .map_err(|e| store_failed(&id, e))
    }
}

fn store_failed(id: &str, err: StoreError) -> StoreError {
    log_event_with_fields(
        Event::StoreFailed,
        &[("collection", id), ("reason", err.to_string().as_str())],
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{MemoryStore, SortOrder};
    use crate::schema::validate_schema_definition;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn collection(limit: usize) -> Collection<MemoryStore> {
        let schema = validate_schema_definition(&json!([
            {"name": "id", "type": "number", "primary": true},
            {"name": "name", "type": "string"}
        ]))
        .unwrap();
        Collection::new("people", schema, MemoryStore::new(), limit).unwrap()
    }

    #[test]
    fn test_operations_persist_through_store() {
        let mut people = collection(100);
        people.create(&json!({"name": "ada"})).unwrap();
        people.create(&json!({"name": "bob"})).unwrap();

        assert_eq!(people.records().unwrap().len(), 2);
        assert_eq!(people.get("2").unwrap()["name"], json!("bob"));

        people.update("2", &json!({"name": "cy"})).unwrap();
        let page = people
            .list(&ListQuery::sorted_by("name", SortOrder::Desc), PageRequest::default())
            .unwrap();
        assert_eq!(page.data[0]["name"], json!("cy"));

        people.delete("1").unwrap();
        assert_eq!(people.records().unwrap().len(), 1);

        people.clear().unwrap();
        assert!(people.records().unwrap().is_empty());
    }

    #[test]
    fn test_seed_only_fills_empty_collection() {
        let mut people = collection(4);
        let mut generator = MockGenerator::with_rng(StdRng::seed_from_u64(5));

        let seeded = people.seed(&mut generator).unwrap();
        assert_eq!(seeded.len(), 4);
        assert_eq!(people.records().unwrap().len(), 4);

        assert!(people.seed(&mut generator).unwrap().is_empty());
    }
}
