// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Recipe Pager
//!
//! Cursor-paginated list endpoints for a recipe-sharing app.
//!
//! ## Features
//!
//! - **Keyset Pagination**: Opaque id cursors with a `take + 1` lookahead
//! - **Stable Under Writes**: Inserts and deletes never shift page boundaries
//! - **Pluggable Stores**: In-memory and DuckDB-backed record stores
//! - **Optional Totals**: Counts run concurrently with the page fetch
//! - **HTTP + CLI**: An axum server and a command-line client over the same services
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use recipe_pager::{
//!     config::PaginationConfig, database::Database, domain::RecipeQuery,
//!     pagination::PageParams, service::RecipeService, store::MissingCursorPolicy,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> recipe_pager::Result<()> {
//!     let db = Database::open("recipes.duckdb")?;
//!     let store = db.recipes(MissingCursorPolicy::Restart);
//!     let service = RecipeService::new(Arc::new(store), PaginationConfig::default());
//!
//!     let mut params = PageParams::default();
//!     loop {
//!         let page = service.list(None, RecipeQuery::default(), &params).await?;
//!         println!("{} recipes", page.len());
//!         match page.next_cursor {
//!             Some(cursor) => params.cursor = Some(cursor.into_inner()),
//!             None => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │           HTTP (axum)  /recipes  /users   │   CLI         │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌───────────────────────────────────────────────────────────┐
//! │   Services: validate take, build filter, project views    │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌───────────────────────────────────────────────────────────┐
//! │   CursorPaginator: take + 1, cursor, concurrent count     │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────┬─────────────────────────────┐
//! │  InMemoryStore              │  DuckDbStore (keyset SQL)   │
//! └─────────────────────────────┴─────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Ordering and shared helper types
pub mod types;

/// Record store capability and the in-memory store
pub mod store;

/// Cursor pagination
pub mod pagination;

/// Recipes, users and their filters
pub mod domain;

/// DuckDB-backed storage
pub mod database;

/// List services behind the endpoints
pub mod service;

/// Application configuration
pub mod config;

/// Command-line interface and HTTP server
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use pagination::{Cursor, CursorPaginator, Page, PageParams, PageRequest};
pub use store::{MissingCursorPolicy, RecordStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
