//! Pagination module
//!
//! Forward-only cursor pagination shared by every list endpoint.
//!
//! # Overview
//!
//! A [`CursorPaginator`] asks its store for `take + 1` records. When the extra
//! record comes back it is dropped from the page and the id of the last kept
//! record becomes the cursor for the next call. Cursors are record ids, never
//! offsets, so deleting records between calls does not shift page boundaries.

mod paginator;
mod types;

pub use paginator::CursorPaginator;
pub use types::{Cursor, Page, PageParams, PageRequest};
