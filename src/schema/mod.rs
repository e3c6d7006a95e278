//! Schema definitions
//!
//! A schema definition is an ordered list of typed fields. It is accepted
//! only after passing the definition validator and is never mutated
//! afterwards: edits replace the whole definition.

mod errors;
mod types;
mod validator;

pub use errors::{SchemaDefinitionError, SchemaErrorCode, SchemaIssue, SchemaResult};
pub use types::{
    Bound, FieldDefinition, FieldType, ItemsDefinition, SchemaDefinition, ValidationRules,
};
pub use validator::validate_schema_definition;
