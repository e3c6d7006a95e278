//! Schema definition error types
//!
//! Error codes:
//! - FAUX_SCHEMA_INVALID_STRUCTURE
//! - FAUX_SCHEMA_INVALID_FIELD_NAME
//! - FAUX_SCHEMA_INVALID_FIELD_TYPE
//! - FAUX_SCHEMA_PRIMARY_KEY
//! - FAUX_SCHEMA_DUPLICATE_FIELD
//! - FAUX_SCHEMA_MISPLACED_RULE
//! - FAUX_SCHEMA_INVALID_RANGE
//! - FAUX_SCHEMA_INVALID_PATTERN
//! - FAUX_SCHEMA_INVALID_ENUM
//! - FAUX_SCHEMA_EMPTY
//! - FAUX_SCHEMA_MISPLACED_STRUCTURE

use std::fmt;

/// Schema definition error codes, declared in rule-priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaErrorCode {
    /// Definition or field is not shaped like JSON objects/arrays
    InvalidStructure,
    /// Name missing, empty, or not purely alphabetic
    InvalidFieldName,
    /// Type outside the closed enumeration
    InvalidFieldType,
    /// Zero or several primaries, or a primary of the wrong type
    PrimaryKey,
    /// Two fields share a name
    DuplicateField,
    /// Validation key not allowed for the field type
    MisplacedRule,
    /// Bound of the wrong kind, or lower bound above upper bound
    InvalidRange,
    /// `pattern` does not compile
    InvalidPattern,
    /// `items.enum` holds values of the wrong type
    InvalidEnum,
    /// Field list has no fields
    EmptySchema,
    /// `items` outside an array field or `fields` outside an object field
    MisplacedStructure,
}

impl SchemaErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::InvalidStructure => "FAUX_SCHEMA_INVALID_STRUCTURE",
            SchemaErrorCode::InvalidFieldName => "FAUX_SCHEMA_INVALID_FIELD_NAME",
            SchemaErrorCode::InvalidFieldType => "FAUX_SCHEMA_INVALID_FIELD_TYPE",
            SchemaErrorCode::PrimaryKey => "FAUX_SCHEMA_PRIMARY_KEY",
            SchemaErrorCode::DuplicateField => "FAUX_SCHEMA_DUPLICATE_FIELD",
            SchemaErrorCode::MisplacedRule => "FAUX_SCHEMA_MISPLACED_RULE",
            SchemaErrorCode::InvalidRange => "FAUX_SCHEMA_INVALID_RANGE",
            SchemaErrorCode::InvalidPattern => "FAUX_SCHEMA_INVALID_PATTERN",
            SchemaErrorCode::InvalidEnum => "FAUX_SCHEMA_INVALID_ENUM",
            SchemaErrorCode::EmptySchema => "FAUX_SCHEMA_EMPTY",
            SchemaErrorCode::MisplacedStructure => "FAUX_SCHEMA_MISPLACED_STRUCTURE",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One rule violation inside a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Dotted path of the offending field (e.g. "address.city"), empty for
    /// the definition itself
    pub path: String,
    pub code: SchemaErrorCode,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(path: impl Into<String>, code: SchemaErrorCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "{} at '{}': {}", self.code, self.path, self.message)
        }
    }
}

/// Rejected schema definition.
///
/// `message()` is the highest-priority violation; `issues()` lists all of
/// them in discovery order.
#[derive(Debug, Clone)]
pub struct SchemaDefinitionError {
    code: SchemaErrorCode,
    message: String,
    issues: Vec<SchemaIssue>,
}

impl SchemaDefinitionError {
    /// Builds the error from a non-empty issue list. The first issue of the
    /// lowest code wins the top-level message.
    pub(crate) fn from_issues(issues: Vec<SchemaIssue>) -> Self {
        let (code, message) = issues
            .iter()
            .min_by_key(|issue| issue.code)
            .map(|issue| (issue.code, issue.message.clone()))
            .unwrap_or((
                SchemaErrorCode::InvalidStructure,
                "Invalid schema definition".to_string(),
            ));
        Self {
            code,
            message,
            issues,
        }
    }

    /// Definition that could not be read as JSON fields at all
    pub fn malformed(reason: impl Into<String>) -> Self {
        let message = format!("Malformed schema definition: {}", reason.into());
        Self::from_issues(vec![SchemaIssue::new(
            "",
            SchemaErrorCode::InvalidStructure,
            message,
        )])
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn issues(&self) -> &[SchemaIssue] {
        &self.issues
    }

    /// True if any issue carries the given code
    pub fn has(&self, code: SchemaErrorCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}

impl fmt::Display for SchemaDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if self.issues.len() > 1 {
            write!(f, " (+{} more)", self.issues.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaDefinitionError {}

pub type SchemaResult<T> = Result<T, SchemaDefinitionError>;
