//! Record store abstractions
//!
//! Defines the capability the paginator consumes: an ordered, filtered,
//! resumable fetch plus an optional count.

use crate::error::Result;
use crate::types::OrderBy;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything with a unique, immutable identifier
pub trait Record: Send + Sync {
    /// The record id (also used verbatim as the pagination cursor)
    fn id(&self) -> &str;
}

/// A value a record can be ordered by
///
/// Variants compare by kind first, so a single field must always produce the
/// same variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    /// Missing value (sorts first)
    Null,
    /// Integer value
    Integer(i64),
    /// Text value (byte-wise comparison)
    Text(String),
    /// Timestamp value
    Timestamp(DateTime<Utc>),
}

impl From<DateTime<Utc>> for SortValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A record that can expose its ordering keys in memory
pub trait OrderedRecord: Record {
    /// Value of the named field, or `None` if the record has no such field
    fn sort_value(&self, field: &str) -> Option<SortValue>;
}

/// An in-memory predicate over records
pub trait RecordFilter<R>: Send + Sync {
    /// Whether the record is eligible
    fn matches(&self, record: &R) -> bool;
}

/// Filter that accepts every record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchAll;

impl<R> RecordFilter<R> for MatchAll {
    fn matches(&self, _record: &R) -> bool {
        true
    }
}

/// What a store does when asked to resume after an id it cannot find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCursorPolicy {
    /// Start again from the beginning of the ordering
    #[default]
    Restart,
    /// Treat the sequence as finished and return nothing
    Exhausted,
}

/// The storage capability consumed by the paginator
///
/// Implementations must order by `order` and then by `id` in the same
/// direction, which makes the ordering total and keeps page boundaries
/// stable.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Record type returned by this store
    type Record: Record;
    /// Filter type understood by this store
    type Filter: Send + Sync;

    /// Fetch up to `limit` matching records, strictly after `resume_after`
    async fn fetch_page(
        &self,
        filter: &Self::Filter,
        order: &OrderBy,
        resume_after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Self::Record>>;

    /// Count matching records, ignoring any pagination window
    ///
    /// `Ok(None)` means this store cannot count.
    async fn count(&self, _filter: &Self::Filter) -> Result<Option<u64>> {
        Ok(None)
    }
}
