//! Record validation errors
//!
//! `FieldError` is ordinary bad input and is always collected in full.
//! `CompileError` means an accepted schema could not be turned into a
//! validator, which is a broken invariant.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Machine-readable reason a field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorCode {
    /// Field absent and neither nullable nor defaulted
    Required,
    /// JSON kind does not match the field type
    InvalidType,
    /// Below a minimum (length, value, date or item count)
    TooSmall,
    /// Above a maximum
    TooBig,
    /// String failed a pattern or format check
    InvalidString,
    /// Not a strict date/datetime literal
    InvalidDate,
    /// Array element outside `items.enum`
    InvalidEnumValue,
    /// Undeclared key under a rejecting policy
    UnrecognizedKeys,
}

impl ValidationErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorCode::Required => "required",
            ValidationErrorCode::InvalidType => "invalid_type",
            ValidationErrorCode::TooSmall => "too_small",
            ValidationErrorCode::TooBig => "too_big",
            ValidationErrorCode::InvalidString => "invalid_string",
            ValidationErrorCode::InvalidDate => "invalid_date",
            ValidationErrorCode::InvalidEnumValue => "invalid_enum_value",
            ValidationErrorCode::UnrecognizedKeys => "unrecognized_keys",
        }
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One failed constraint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Dotted path (e.g. "address.city", "tags.2")
    pub field: String,
    pub message: String,
    pub code: ValidationErrorCode,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        code: ValidationErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorCode::Required, "Required")
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &str, received: &str) -> Self {
        Self::new(
            field,
            ValidationErrorCode::InvalidType,
            format!("Expected {}, received {}", expected, received),
        )
    }

    pub fn too_small(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorCode::TooSmall, message)
    }

    pub fn too_big(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorCode::TooBig, message)
    }

    pub fn invalid_string(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorCode::InvalidString, message)
    }

    pub fn invalid_date(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorCode::InvalidDate, message)
    }

    pub fn unrecognized_key(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Unrecognized key '{}'", field);
        Self::new(field, ValidationErrorCode::UnrecognizedKeys, message)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.code)
    }
}

/// An accepted schema that cannot be compiled
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("FAUX_SCHEMA_COMPILE_FAILED: invalid pattern on field '{field}': {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("FAUX_SCHEMA_COMPILE_FAILED: invalid date bound '{value}' on field '{field}'")]
    InvalidDateBound { field: String, value: String },

    #[error("FAUX_SCHEMA_COMPILE_FAILED: non-numeric bound on number field '{field}'")]
    InvalidNumberBound { field: String },
}

impl CompileError {
    pub fn field(&self) -> &str {
        match self {
            CompileError::InvalidPattern { field, .. }
            | CompileError::InvalidDateBound { field, .. }
            | CompileError::InvalidNumberBound { field } => field,
        }
    }
}

/// Renders a short summary such as `name: Required; age: ...`
pub fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_error_serializes_snake_case_code() {
        let err = FieldError::type_mismatch("age", "number", "string");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "field": "age",
                "message": "Expected number, received string",
                "code": "invalid_type"
            })
        );
    }

    #[test]
    fn test_summarize() {
        let errors = vec![
            FieldError::required("name"),
            FieldError::too_small("age", "Number must be greater than or equal to 0"),
        ];
        assert_eq!(
            summarize(&errors),
            "name: Required; age: Number must be greater than or equal to 0"
        );
    }

    #[test]
    fn test_compile_error_names_field() {
        let err = CompileError::InvalidPattern {
            field: "code".into(),
            reason: "unclosed class".into(),
        };
        assert_eq!(err.field(), "code");
        assert!(err.to_string().starts_with("FAUX_SCHEMA_COMPILE_FAILED"));
    }
}
