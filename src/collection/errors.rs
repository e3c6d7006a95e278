//! # Collection Errors
//!
//! Error types for the record collection engine and its stores.

use thiserror::Error;

use crate::schema::FieldType;
use crate::validation::{summarize, CompileError, FieldError};

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Record store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Filesystem read or write failed
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    /// Stored collection is not a JSON array of records
    #[error("Corrupt collection file {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// Collection id cannot be mapped to a file name
    #[error("Invalid collection id: {0:?}")]
    InvalidId(String),
}

/// Collection engine errors
#[derive(Debug, Clone, Error)]
pub enum CollectionError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// No record with the given primary key
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Payload failed record validation
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// Payload is not a JSON object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Update would give a record the key of another record
    #[error("Duplicate primary key: {0}")]
    DuplicateKey(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Primary field type has no key generator
    #[error("Unsupported primary key type: {0}")]
    UnsupportedPrimaryType(FieldType),

    /// Schema has no primary field
    #[error("Schema has no primary field")]
    MissingPrimaryKey,

    /// Accepted schema could not be compiled
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CollectionError {
    /// HTTP-like status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CollectionError::InvalidPayload(_) => 400,
            CollectionError::NotFound(_) => 404,
            CollectionError::DuplicateKey(_) => 409,
            CollectionError::Validation(_) => 422,
            CollectionError::UnsupportedPrimaryType(_)
            | CollectionError::MissingPrimaryKey
            | CollectionError::Compile(_)
            | CollectionError::Store(_) => 500,
        }
    }

    /// Stable machine code
    pub fn code(&self) -> &'static str {
        match self {
            CollectionError::NotFound(_) => "FAUX_RECORD_NOT_FOUND",
            CollectionError::Validation(_) => "FAUX_RECORD_INVALID",
            CollectionError::InvalidPayload(_) => "FAUX_PAYLOAD_INVALID",
            CollectionError::DuplicateKey(_) => "FAUX_DUPLICATE_KEY",
            CollectionError::UnsupportedPrimaryType(_) => "FAUX_PRIMARY_UNSUPPORTED",
            CollectionError::MissingPrimaryKey => "FAUX_PRIMARY_MISSING",
            CollectionError::Compile(_) => "FAUX_SCHEMA_COMPILE_FAILED",
            CollectionError::Store(_) => "FAUX_STORE_FAILED",
        }
    }

    /// Field errors when this is a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            CollectionError::Validation(errors) => errors,
            _ => &[],
        }
    }
}
