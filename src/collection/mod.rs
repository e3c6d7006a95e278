//! Record collections
//!
//! Key generation, upsert, sort, pagination and persistence for the records
//! of one schema.

mod engine;
mod errors;
mod handle;
mod primary_key;
mod query;
mod store;

pub use engine::{
    delete_record, get_record_by_primary_key, list_records, update_record, upsert_record,
    RecordEngine,
};
pub use errors::{CollectionError, CollectionResult, StoreError};
pub use handle::Collection;
pub use primary_key::{
    generate_primary_key, generate_primary_key_with, key_matches, key_string, key_value_matches,
};
pub(crate) use primary_key::random_uuid;
pub use query::{
    paginate, sort_records, ListQuery, Page, PageRequest, SortOrder, DEFAULT_PAGE_LIMIT,
    MAX_PAGE_LIMIT,
};
pub use store::{FileStore, MemoryStore, RecordStore};
