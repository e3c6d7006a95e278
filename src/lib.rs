//! fauxbase - schema-defined records, validation and mock data
//!
//! A schema definition is checked once, then drives record validation,
//! mock record synthesis and a schema-bound record collection.

pub mod cli;
pub mod collection;
pub mod mock;
pub mod observability;
pub mod schema;
pub mod temporal;
pub mod validation;

pub use collection::{
    delete_record, generate_primary_key, get_record_by_primary_key, list_records, paginate,
    update_record, upsert_record, Collection, CollectionError, ListQuery, Page, PageRequest,
    SortOrder,
};
pub use mock::{generate_mock_batch, MockGenerator, MOCK_BATCH_SIZE};
pub use schema::{validate_schema_definition, SchemaDefinition, SchemaDefinitionError};
pub use validation::{validate_data, CompileError, FieldError, ValidationResult};
