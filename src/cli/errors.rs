//! CLI-specific error types

use std::fmt;
use std::io;

use serde_json::{json, Value};

use crate::collection::CollectionError;
use crate::schema::SchemaDefinitionError;
use crate::validation::CompileError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout/files)
    IoError,
    /// Bad argument value
    InvalidArgument,
    /// Error raised by the library, carrying its own code
    Domain(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "FAUX_CLI_CONFIG_ERROR",
            Self::IoError => "FAUX_CLI_IO_ERROR",
            Self::InvalidArgument => "FAUX_CLI_INVALID_ARGUMENT",
            Self::Domain(code) => *code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    details: Option<Value>,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured detail (schema issues, field errors)
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaDefinitionError> for CliError {
    fn from(e: SchemaDefinitionError) -> Self {
        let issues: Vec<Value> = e
            .issues()
            .iter()
            .map(|i| json!({"path": i.path, "code": i.code.code(), "message": i.message}))
            .collect();
        Self::new(CliErrorCode::Domain(e.code().code()), e.message())
            .with_details(Value::Array(issues))
    }
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        Self::new(CliErrorCode::Domain("FAUX_SCHEMA_COMPILE_FAILED"), e.to_string())
    }
}

impl From<CollectionError> for CliError {
    fn from(e: CollectionError) -> Self {
        let err = Self::new(CliErrorCode::Domain(e.code()), e.to_string());
        match serde_json::to_value(e.field_errors()) {
            Ok(Value::Array(errors)) if !errors.is_empty() => err.with_details(Value::Array(errors)),
            _ => err,
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;

    #[test]
    fn test_domain_codes_pass_through() {
        let err = CliError::from(CollectionError::NotFound("7".into()));
        assert_eq!(err.code_str(), "FAUX_RECORD_NOT_FOUND");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_validation_errors_become_details() {
        let err = CliError::from(CollectionError::Validation(vec![FieldError::required("name")]));
        assert_eq!(err.code_str(), "FAUX_RECORD_INVALID");
        assert_eq!(err.details().unwrap()[0]["field"], "name");
    }

    #[test]
    fn test_display() {
        let err = CliError::invalid_argument("bad order");
        assert_eq!(err.to_string(), "FAUX_CLI_INVALID_ARGUMENT: bad order");
    }
}
