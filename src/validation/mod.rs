//! Dynamic record validation
//!
//! An accepted `SchemaDefinition` is compiled into a `RecordValidator`,
//! which checks candidate records and produces their normalized form.

mod errors;
mod formats;
mod result;
mod spec;
mod validator;

pub use errors::{summarize, CompileError, FieldError, ValidationErrorCode};
pub use formats::{is_email, is_url, is_uuid};
pub use result::ValidationResult;
pub use validator::{RecordValidator, UnknownKeys, ROOT_PATH};

use serde_json::Value;

use crate::schema::SchemaDefinition;

/// Validates one record against a schema with the default key policy.
///
/// # Errors
///
/// Returns `CompileError` only if the schema cannot be compiled; ordinary
/// bad input is reported inside the `ValidationResult`.
pub fn validate_data(
    record: &Value,
    schema: &SchemaDefinition,
) -> Result<ValidationResult, CompileError> {
    Ok(RecordValidator::compile(schema)?.validate(record))
}
