//! DuckDB database handle
//!
//! Owns the single DuckDB connection, creates the schema and writes records.
//! All work runs on tokio's blocking pool so async callers never block a
//! runtime thread.

use crate::domain::{normalize_labels, slugify, Recipe, User};
use crate::error::{Error, Result};
use duckdb::{params, Connection, InterruptHandle};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Schema for the relational store
///
/// Timestamps are stored as microseconds since the Unix epoch.
const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id            VARCHAR PRIMARY KEY,
    email         VARCHAR NOT NULL UNIQUE,
    name          VARCHAR,
    role          VARCHAR NOT NULL DEFAULT 'USER',
    password_hash VARCHAR,
    created_at    BIGINT NOT NULL
);

CREATE TABLE IF NOT EXISTS recipes (
    id              VARCHAR PRIMARY KEY,
    slug            VARCHAR NOT NULL UNIQUE,
    title           VARCHAR NOT NULL,
    description     VARCHAR,
    is_public       BOOLEAN NOT NULL DEFAULT TRUE,
    difficulty      VARCHAR NOT NULL DEFAULT 'EASY',
    prep_time       BIGINT,
    cooking_time    BIGINT,
    author_id       VARCHAR NOT NULL,
    likes_count     BIGINT NOT NULL DEFAULT 0,
    favorites_count BIGINT NOT NULL DEFAULT 0,
    comments_count  BIGINT NOT NULL DEFAULT 0,
    created_at      BIGINT NOT NULL,
    updated_at      BIGINT NOT NULL
);

CREATE TABLE IF NOT EXISTS recipe_tags (
    recipe_id VARCHAR NOT NULL,
    position  INTEGER NOT NULL,
    tag       VARCHAR NOT NULL,
    PRIMARY KEY (recipe_id, position)
);

CREATE TABLE IF NOT EXISTS recipe_ingredients (
    recipe_id VARCHAR NOT NULL,
    position  INTEGER NOT NULL,
    name      VARCHAR NOT NULL,
    PRIMARY KEY (recipe_id, position)
);

CREATE INDEX IF NOT EXISTS recipes_created_at_idx ON recipes (created_at, id);
CREATE INDEX IF NOT EXISTS users_created_at_idx ON users (created_at, id);
";

/// Shared handle to a DuckDB database
#[derive(Clone)]
pub struct Database {
    /// DuckDB connection, one statement at a time
    conn: Arc<Mutex<Connection>>,
    /// Stops whatever statement the connection is executing
    interrupt: Arc<InterruptHandle>,
    /// Path the database was opened from (for logging)
    path: String,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Progress of one [`Database::run`] call, shared with the blocking task
#[derive(Debug, Default)]
struct RunState {
    cancelled: AtomicBool,
    running: AtomicBool,
}

/// Cancels a [`Database::run`] call when its future is dropped early
///
/// A call still waiting for the connection is skipped; a call already
/// executing is interrupted.
struct CancelOnDrop {
    state: Arc<RunState>,
    interrupt: Arc<InterruptHandle>,
    armed: bool,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state.cancelled.store(true, Ordering::SeqCst);
        if self.state.running.load(Ordering::SeqCst) {
            tracing::debug!("Interrupting cancelled database query");
            self.interrupt.interrupt();
        }
    }
}

impl Database {
    /// Open (or create) a database file, or an in-memory database for `:memory:`
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(|e| Error::config(format!("Failed to open DuckDB database '{path}': {e}")))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::config(format!("Failed to create schema: {e}")))?;

        tracing::debug!(path, "Opened database");

        let interrupt = conn.interrupt_handle();
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt,
            path: path.to_string(),
        })
    }

    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Path this database was opened from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run `f` against the connection on the blocking pool
    ///
    /// Dropping the returned future cancels the call: if `f` has not started
    /// it never runs, otherwise the executing statement is interrupted so the
    /// connection is released promptly.
    pub async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let state = Arc::new(RunState::default());
        let mut cancel = CancelOnDrop {
            state: Arc::clone(&state),
            interrupt: Arc::clone(&self.interrupt),
            armed: true,
        };

        let result = tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| Error::store("database connection lock poisoned"))?;

            state.running.store(true, Ordering::SeqCst);
            if state.cancelled.load(Ordering::SeqCst) {
                state.running.store(false, Ordering::SeqCst);
                return Err(Error::Cancelled);
            }
            let result = f(&mut guard);
            state.running.store(false, Ordering::SeqCst);
            result
        })
        .await;

        cancel.armed = false;
        result?
    }

    /// Insert a user
    pub async fn insert_user(&self, user: User) -> Result<User> {
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO users (id, email, name, role, password_hash, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    user.id,
                    user.email,
                    user.name,
                    user.role.as_str(),
                    user.password_hash,
                    user.created_at.timestamp_micros(),
                ],
            )?;
            Ok(user)
        })
        .await
    }

    /// Insert a recipe with its tags and ingredients
    ///
    /// Labels are normalised and the slug is made unique by appending `-1`,
    /// `-2`, ... on collision. Returns the recipe as stored.
    pub async fn insert_recipe(&self, recipe: Recipe) -> Result<Recipe> {
        self.run(move |conn| {
            let mut recipe = recipe;
            recipe.tags = normalize_labels(&recipe.tags);
            recipe.ingredients = normalize_labels(&recipe.ingredients);

            let tx = conn.transaction()?;
            recipe.slug = unique_slug(&tx, &slugify(&recipe.title))?;

            tx.execute(
                "INSERT INTO recipes (id, slug, title, description, is_public, difficulty,
                     prep_time, cooking_time, author_id, likes_count, favorites_count,
                     comments_count, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    recipe.id,
                    recipe.slug,
                    recipe.title,
                    recipe.description,
                    recipe.is_public,
                    recipe.difficulty.as_str(),
                    recipe.prep_time,
                    recipe.cooking_time,
                    recipe.author_id,
                    to_sql_count(recipe.likes_count),
                    to_sql_count(recipe.favorites_count),
                    to_sql_count(recipe.comments_count),
                    recipe.created_at.timestamp_micros(),
                    recipe.updated_at.timestamp_micros(),
                ],
            )?;

            for (position, tag) in recipe.tags.iter().enumerate() {
                tx.execute(
                    "INSERT INTO recipe_tags (recipe_id, position, tag) VALUES (?, ?, ?)",
                    params![recipe.id, position as i64, tag],
                )?;
            }
            for (position, name) in recipe.ingredients.iter().enumerate() {
                tx.execute(
                    "INSERT INTO recipe_ingredients (recipe_id, position, name) VALUES (?, ?, ?)",
                    params![recipe.id, position as i64, name],
                )?;
            }

            tx.commit()?;
            Ok(recipe)
        })
        .await
    }

    /// Delete a recipe and its labels, returning whether it existed
    pub async fn delete_recipe(&self, id: impl Into<String>) -> Result<bool> {
        let id = id.into();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM recipe_tags WHERE recipe_id = ?", params![id])?;
            tx.execute("DELETE FROM recipe_ingredients WHERE recipe_id = ?", params![id])?;
            let deleted = tx.execute("DELETE FROM recipes WHERE id = ?", params![id])?;
            tx.commit()?;
            Ok(deleted > 0)
        })
        .await
    }

    /// Number of rows in `recipes` and `users`
    pub async fn row_counts(&self) -> Result<(u64, u64)> {
        self.run(|conn| {
            let recipes: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
            let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok((from_sql_count(recipes), from_sql_count(users)))
        })
        .await
    }
}

/// First free slug among `base`, `base-1`, `base-2`, ...
fn unique_slug(conn: &Connection, base: &str) -> Result<String> {
    let mut slug = base.to_string();
    let mut counter = 1;
    loop {
        let taken: i64 = conn.query_row(
            "SELECT COUNT(*) FROM recipes WHERE slug = ?",
            params![slug],
            |row| row.get(0),
        )?;
        if taken == 0 {
            return Ok(slug);
        }
        slug = format!("{base}-{counter}");
        counter += 1;
    }
}

pub(crate) fn to_sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn from_sql_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
