//! Record store module
//!
//! The capability every list endpoint paginates over.
//!
//! # Overview
//!
//! The store module provides:
//! - `RecordStore` - async fetch/count capability consumed by the paginator
//! - `Record`, `OrderedRecord`, `RecordFilter` - what stores need from records and filters
//! - `InMemoryStore` - a lock-guarded vector store for tests and embedding
//!
//! The DuckDB-backed store lives in [`crate::database`].

mod memory;
mod types;

pub use memory::InMemoryStore;
pub use types::{
    MatchAll, MissingCursorPolicy, OrderedRecord, Record, RecordFilter, RecordStore, SortValue,
};
