//! Keyset-paginated record store over DuckDB
//!
//! Each entity describes its table, selectable columns, orderable columns and
//! how its filter becomes SQL. [`DuckDbStore`] turns that into a keyset query:
//!
//! ```sql
//! SELECT ... FROM recipes e
//! WHERE <filter> AND (e.created_at < ? OR (e.created_at = ? AND e.id < ?))
//! ORDER BY e.created_at DESC, e.id DESC
//! LIMIT 21
//! ```

use super::engine::Database;
use crate::error::{Error, Result};
use crate::store::{MissingCursorPolicy, Record, RecordStore};
use crate::types::OrderBy;
use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection, Row};
use std::marker::PhantomData;

/// WHERE-clause fragments with their positional parameters
#[derive(Debug, Clone, Default)]
pub struct SqlFilter {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl SqlFilter {
    /// Create an empty filter (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition with one `?` per parameter
    pub fn push(&mut self, clause: impl Into<String>, params: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause.into());
        self.params.extend(params);
    }

    /// The `WHERE ...` clause, or an empty string
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Parameters in clause order
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// A record type stored in a DuckDB table
pub trait SqlEntity: Record + Sized + Send + 'static {
    /// Filter type accepted by list queries
    type Filter: Send + Sync;

    /// Table name; the table is aliased as `e` in every query
    const TABLE: &'static str;

    /// Select list, in the order [`SqlEntity::from_row`] reads it
    const COLUMNS: &'static str;

    /// Columns besides `id` that may be used as an ordering key
    const ORDER_COLUMNS: &'static [&'static str];

    /// Build a record from a row produced by [`SqlEntity::COLUMNS`]
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self>;

    /// Translate a filter into SQL conditions
    fn filter_sql(filter: &Self::Filter) -> SqlFilter;
}

/// A [`RecordStore`] backed by one DuckDB table
#[derive(Debug)]
pub struct DuckDbStore<E> {
    db: Database,
    missing_cursor: MissingCursorPolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for DuckDbStore<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            missing_cursor: self.missing_cursor,
            _entity: PhantomData,
        }
    }
}

impl<E: SqlEntity> DuckDbStore<E> {
    /// Create a store over `db`
    pub fn new(db: Database) -> Self {
        Self {
            db,
            missing_cursor: MissingCursorPolicy::default(),
            _entity: PhantomData,
        }
    }

    /// Set the policy for cursors that point at missing rows
    #[must_use]
    pub fn with_missing_cursor_policy(mut self, policy: MissingCursorPolicy) -> Self {
        self.missing_cursor = policy;
        self
    }

    /// Validate the ordering key against the column whitelist
    fn order_column(order: &OrderBy) -> Result<&'static str> {
        if order.is_id() {
            return Ok("id");
        }
        E::ORDER_COLUMNS
            .iter()
            .copied()
            .find(|c| *c == order.field)
            .ok_or_else(|| Error::unsupported_order(E::TABLE, &order.field))
    }
}

/// Sort key of the anchor row, or `None` if the row is gone
fn anchor_key(conn: &Connection, table: &str, column: &str, id: &str) -> Result<Option<Value>> {
    let sql = format!("SELECT e.{column} FROM {table} e WHERE e.id = ?");
    match conn.query_row(&sql, duckdb::params![id], |row| row.get::<_, Value>(0)) {
        Ok(value) => Ok(Some(value)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl<E: SqlEntity> RecordStore for DuckDbStore<E> {
    type Record = E;
    type Filter = E::Filter;

    async fn fetch_page(
        &self,
        filter: &E::Filter,
        order: &OrderBy,
        resume_after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<E>> {
        let column = Self::order_column(order)?;
        let direction = order.direction;
        let mut sql_filter = E::filter_sql(filter);
        let resume_after = resume_after.map(str::to_string);
        let policy = self.missing_cursor;

        self.db
            .run(move |conn| {
                if let Some(id) = resume_after {
                    let op = direction.after_operator();
                    match anchor_key(conn, E::TABLE, column, &id)? {
                        Some(_) if column == "id" => {
                            sql_filter.push(format!("e.id {op} ?"), [Value::Text(id)]);
                        }
                        Some(key) => {
                            sql_filter.push(
                                format!("(e.{column} {op} ? OR (e.{column} = ? AND e.id {op} ?))"),
                                [key.clone(), key, Value::Text(id)],
                            );
                        }
                        None => {
                            tracing::warn!(cursor = %id, table = E::TABLE, policy = ?policy, "Cursor record not found");
                            if policy == MissingCursorPolicy::Exhausted {
                                return Ok(Vec::new());
                            }
                        }
                    }
                }

                let dir = direction.as_sql();
                let sql = format!(
                    "SELECT {columns} FROM {table} e {filter} ORDER BY e.{column} {dir}, e.id {dir} LIMIT {limit}",
                    columns = E::COLUMNS,
                    table = E::TABLE,
                    filter = sql_filter.where_sql(),
                );

                tracing::debug!("Executing query: {}", sql);

                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(sql_filter.params()), E::from_row)?;
                Ok(rows.collect::<duckdb::Result<Vec<_>>>()?)
            })
            .await
    }

    async fn count(&self, filter: &E::Filter) -> Result<Option<u64>> {
        let sql_filter = E::filter_sql(filter);

        self.db
            .run(move |conn| {
                let sql = format!(
                    "SELECT COUNT(*) FROM {table} e {filter}",
                    table = E::TABLE,
                    filter = sql_filter.where_sql(),
                );

                tracing::debug!("Executing query: {}", sql);

                let count: i64 =
                    conn.query_row(&sql, params_from_iter(sql_filter.params()), |row| row.get(0))?;
                Ok(Some(super::engine::from_sql_count(count)))
            })
            .await
    }
}
