//! CLI module
//!
//! Command-line interface for serving and inspecting recipe listings.
//!
//! # Commands
//!
//! - `serve` - Start HTTP server mode
//! - `seed` - Fill the database with demo data
//! - `recipes` - Print a page of recipes
//! - `users` - Print a page of users
//! - `config` - Print the effective configuration

mod commands;
mod runner;
mod server;


pub use commands::{Cli, Commands, OutputFormat, PageArgs};
pub use runner::Runner;
pub use server::{router, serve, status_for, ApiError, AppState, OptionalViewer, VIEWER_HEADER};
