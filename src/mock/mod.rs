//! Mock record synthesis
//!
//! Produces batches of synthetic records that satisfy a schema closely
//! enough to seed an empty collection. String clamping is a hard cut, so a
//! pattern-directed string may not survive a `maxLength` rule.

mod generator;
mod pattern;
mod words;

pub use generator::{MockGenerator, MAX_MOCK_STRING, MOCK_BATCH_SIZE};

use serde_json::Value;

use crate::collection::CollectionResult;
use crate::schema::SchemaDefinition;

/// Generates one batch with an entropy-seeded generator.
pub fn generate_mock_batch(schema: &SchemaDefinition) -> CollectionResult<Vec<Value>> {
    MockGenerator::new().generate_batch(schema)
}
