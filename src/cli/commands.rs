//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Recipe listing API with cursor pagination
#[derive(Parser, Debug)]
#[command(name = "recipe-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// DuckDB database file (overrides config and DATABASE_PATH)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server mode
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fill the database with demo users and recipes
    Seed {
        /// Number of users to create
        #[arg(long, default_value = "5")]
        users: usize,

        /// Number of recipes to create
        #[arg(long, default_value = "40")]
        recipes: usize,
    },

    /// Print one page of recipes
    Recipes {
        #[command(flatten)]
        page: PageArgs,

        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,

        /// Required tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,

        /// Required ingredients (comma-separated)
        #[arg(long)]
        ingredients: Option<String>,

        /// List as this user id (includes their private recipes)
        #[arg(long)]
        viewer: Option<String>,
    },

    /// Print one page of users
    Users {
        #[command(flatten)]
        page: PageArgs,

        /// Only users with this role (USER or ADMIN)
        #[arg(long)]
        role: Option<String>,

        /// Case-insensitive email or name search
        #[arg(long)]
        search: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

/// Pagination arguments shared by list commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Cursor returned by the previous page
    #[arg(long)]
    pub cursor: Option<String>,

    /// Page size
    #[arg(long)]
    pub take: Option<usize>,

    /// Follow cursors and print every page
    #[arg(long)]
    pub all: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one page per line)
    Json,
    /// Human-readable output
    Pretty,
}
