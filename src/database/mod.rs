//! Relational record store via DuckDB
//!
//! This module provides the persistent [`RecordStore`](crate::store::RecordStore)
//! implementation. Lists are served with keyset queries on
//! `(order column, id)`, so a page costs the same no matter how deep the
//! cursor is.

mod engine;
mod entities;
mod store;

pub use engine::Database;
pub use store::{DuckDbStore, SqlEntity, SqlFilter};

use crate::domain::{Recipe, User};
use crate::store::MissingCursorPolicy;

impl Database {
    /// Recipe store over this database
    pub fn recipes(&self, policy: MissingCursorPolicy) -> DuckDbStore<Recipe> {
        DuckDbStore::new(self.clone()).with_missing_cursor_policy(policy)
    }

    /// User store over this database
    pub fn users(&self, policy: MissingCursorPolicy) -> DuckDbStore<User> {
        DuckDbStore::new(self.clone()).with_missing_cursor_policy(policy)
    }
}
