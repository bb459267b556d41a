//! Pagination types
//!
//! Requests, pages and cursors shared by every list endpoint.

use crate::error::{Error, Result};
use crate::types::{OptionStringExt, OrderBy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque resume token
///
/// Holds the id of the last record of the previous page. Clients must hand
/// it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Create a cursor from a record id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The record id this cursor points after
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the cursor, returning the record id
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for Cursor {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for Cursor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A request for one page of records
#[derive(Debug, Clone)]
pub struct PageRequest<F> {
    /// Store-specific filter, passed through untouched
    pub filter: F,
    /// Ordering key (ties broken on id by the store)
    pub order_by: OrderBy,
    /// Maximum number of records in the page, at least 1
    ///
    /// With 0 no record is ever returned and no cursor is produced, so
    /// callers validate client input first (see [`PageParams::validate`]).
    pub take: usize,
    /// Resume strictly after this record
    pub cursor: Option<Cursor>,
    /// Whether to also count all matching records
    pub include_total: bool,
}

impl<F> PageRequest<F> {
    /// Page size used when none is given
    pub const DEFAULT_TAKE: usize = 20;

    /// Create a first-page request with default settings
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            order_by: OrderBy::default(),
            take: Self::DEFAULT_TAKE,
            cursor: None,
            include_total: false,
        }
    }

    /// Set the page size
    #[must_use]
    pub fn with_take(mut self, take: usize) -> Self {
        self.take = take;
        self
    }

    /// Set the ordering
    #[must_use]
    pub fn ordered_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    /// Resume after the given cursor (or start over with `None`)
    #[must_use]
    pub fn with_cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Resume after the given cursor
    #[must_use]
    pub fn after(self, cursor: impl Into<Cursor>) -> Self {
        self.with_cursor(Some(cursor.into()))
    }

    /// Request a total count alongside the page
    #[must_use]
    pub fn with_total(mut self, include_total: bool) -> Self {
        self.include_total = include_total;
        self
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Records in this page, in order
    pub data: Vec<T>,
    /// Cursor for the following page, present iff more records exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
    /// Count of all matching records, when requested and supported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<T> Page<T> {
    /// A page with no records and no continuation
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            next_cursor: None,
            total: None,
        }
    }

    /// Whether another page follows this one
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Number of records in this page
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page has no records
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Transform each record, keeping the cursor and total
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            total: self.total,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Client-supplied pagination parameters (`?cursor=...&take=...`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    /// Cursor returned by the previous page
    #[serde(default)]
    pub cursor: Option<String>,
    /// Requested page size
    #[serde(default)]
    pub take: Option<usize>,
}

impl PageParams {
    /// Create parameters
    pub fn new(cursor: Option<String>, take: Option<usize>) -> Self {
        Self { cursor, take }
    }

    /// Validate the requested page size against `max_take`
    pub fn validate(&self, max_take: usize) -> Result<()> {
        match self.take {
            Some(0) => Err(Error::invalid_request("take must be a positive integer")),
            Some(take) if take > max_take => Err(Error::invalid_request(format!(
                "take must not exceed {max_take}"
            ))),
            _ => Ok(()),
        }
    }

    /// Page size, falling back to the endpoint default
    pub fn take_or(&self, default: usize) -> usize {
        self.take.unwrap_or(default)
    }

    /// Cursor, treating an empty string as absent
    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor.clone().none_if_empty().map(Cursor::from)
    }

    /// Build a page request for `filter` using these parameters
    pub fn to_request<F>(&self, filter: F, order_by: OrderBy, default_take: usize) -> PageRequest<F> {
        PageRequest::new(filter)
            .ordered_by(order_by)
            .with_take(self.take_or(default_take))
            .with_cursor(self.cursor())
    }
}
