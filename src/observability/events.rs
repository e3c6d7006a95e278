//! Observable events
//!
//! Events are explicit and typed. Their string form is the `event` key of a
//! log line.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,

    // Schema definitions
    /// Schema definition passed every rule
    SchemaAccepted,
    /// Schema definition rejected
    SchemaRejected,
    /// Accepted schema could not be compiled into a validator
    SchemaCompileFailed,

    // Records
    /// Record appended to a collection
    RecordCreated,
    /// Record merged and replaced in place
    RecordUpdated,
    /// Record removed
    RecordDeleted,
    /// Write rejected by the record validator
    RecordRejected,
    /// Oldest records dropped to stay within the tier limit
    CollectionTruncated,

    // Mock data
    /// Mock batch produced
    MockBatchGenerated,
    /// Empty collection filled with a mock batch
    CollectionSeeded,

    // Storage
    /// Collection blob could not be read or written
    StoreFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaAccepted => "SCHEMA_ACCEPTED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::SchemaCompileFailed => "SCHEMA_COMPILE_FAILED",
            Event::RecordCreated => "RECORD_CREATED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::CollectionTruncated => "COLLECTION_TRUNCATED",
            Event::MockBatchGenerated => "MOCK_BATCH_GENERATED",
            Event::CollectionSeeded => "COLLECTION_SEEDED",
            Event::StoreFailed => "STORE_FAILED",
        }
    }

    /// Events that signal a broken invariant rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::SchemaCompileFailed)
    }

    /// Events caused by rejected input.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::SchemaRejected | Event::RecordRejected | Event::CollectionTruncated
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Event::StoreFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
