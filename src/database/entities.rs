//! Table mappings for domain records

use super::engine::from_sql_count;
use super::store::{SqlEntity, SqlFilter};
use crate::domain::{Recipe, RecipeFilter, User, UserFilter};
use chrono::{DateTime, Utc};
use duckdb::types::{Type, Value};
use duckdb::Row;
use std::str::FromStr;

/// Separator used when aggregating labels into one column
const LABEL_SEPARATOR: char = '\u{1f}';

fn conversion_error(idx: usize, ty: Type, message: String) -> duckdb::Error {
    duckdb::Error::FromSqlConversionFailure(idx, ty, message.into())
}

fn timestamp(row: &Row<'_>, idx: usize) -> duckdb::Result<DateTime<Utc>> {
    let micros: i64 = row.get(idx)?;
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        conversion_error(idx, Type::BigInt, format!("timestamp out of range: {micros}"))
    })
}

fn parsed<T: FromStr>(row: &Row<'_>, idx: usize) -> duckdb::Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: T::Err| conversion_error(idx, Type::Text, e.to_string()))
}

fn labels(row: &Row<'_>, idx: usize) -> duckdb::Result<Vec<String>> {
    let joined: Option<String> = row.get(idx)?;
    Ok(joined
        .map(|s| s.split(LABEL_SEPARATOR).map(str::to_string).collect())
        .unwrap_or_default())
}

fn count(row: &Row<'_>, idx: usize) -> duckdb::Result<u64> {
    Ok(from_sql_count(row.get(idx)?))
}

impl SqlEntity for Recipe {
    type Filter = RecipeFilter;

    const TABLE: &'static str = "recipes";

    const COLUMNS: &'static str = "e.id, e.slug, e.title, e.description, e.is_public, e.difficulty, \
        e.prep_time, e.cooking_time, e.author_id, \
        (SELECT string_agg(t.tag, chr(31) ORDER BY t.position) FROM recipe_tags t WHERE t.recipe_id = e.id), \
        (SELECT string_agg(i.name, chr(31) ORDER BY i.position) FROM recipe_ingredients i WHERE i.recipe_id = e.id), \
        e.likes_count, e.favorites_count, e.comments_count, e.created_at, e.updated_at";

    const ORDER_COLUMNS: &'static [&'static str] = &["created_at", "updated_at", "title", "slug"];

    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            slug: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            is_public: row.get(4)?,
            difficulty: parsed(row, 5)?,
            prep_time: row.get(6)?,
            cooking_time: row.get(7)?,
            author_id: row.get(8)?,
            tags: labels(row, 9)?,
            ingredients: labels(row, 10)?,
            likes_count: count(row, 11)?,
            favorites_count: count(row, 12)?,
            comments_count: count(row, 13)?,
            created_at: timestamp(row, 14)?,
            updated_at: timestamp(row, 15)?,
        })
    }

    fn filter_sql(filter: &RecipeFilter) -> SqlFilter {
        let mut sql = SqlFilter::new();

        match &filter.viewer_id {
            Some(viewer) => sql.push(
                "(e.is_public OR e.author_id = ?)",
                [Value::Text(viewer.clone())],
            ),
            None => sql.push("e.is_public", []),
        }
        if let Some(search) = &filter.search {
            sql.push(
                "contains(lower(e.title), lower(?))",
                [Value::Text(search.clone())],
            );
        }
        if let Some(is_public) = filter.is_public {
            sql.push("e.is_public = ?", [Value::Boolean(is_public)]);
        }
        if let Some(difficulty) = filter.difficulty {
            sql.push(
                "e.difficulty = ?",
                [Value::Text(difficulty.as_str().to_string())],
            );
        }
        for tag in &filter.tags {
            sql.push(
                "EXISTS (SELECT 1 FROM recipe_tags t WHERE t.recipe_id = e.id AND t.tag = ?)",
                [Value::Text(tag.clone())],
            );
        }
        for ingredient in &filter.ingredients {
            sql.push(
                "EXISTS (SELECT 1 FROM recipe_ingredients i WHERE i.recipe_id = e.id AND i.name = ?)",
                [Value::Text(ingredient.clone())],
            );
        }
        if let Some(max) = filter.max_prep_time {
            sql.push("e.prep_time <= ?", [Value::BigInt(max)]);
        }
        if let Some(max) = filter.max_cooking_time {
            sql.push("e.cooking_time <= ?", [Value::BigInt(max)]);
        }

        sql
    }
}

impl SqlEntity for User {
    type Filter = UserFilter;

    const TABLE: &'static str = "users";

    const COLUMNS: &'static str = "e.id, e.email, e.name, e.role, e.password_hash, e.created_at";

    const ORDER_COLUMNS: &'static [&'static str] = &["created_at", "email"];

    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            role: parsed(row, 3)?,
            password_hash: row.get(4)?,
            created_at: timestamp(row, 5)?,
        })
    }

    fn filter_sql(filter: &UserFilter) -> SqlFilter {
        let mut sql = SqlFilter::new();

        if let Some(role) = filter.role {
            sql.push("e.role = ?", [Value::Text(role.as_str().to_string())]);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            sql.push(
                "(contains(lower(e.email), lower(?)) OR contains(lower(COALESCE(e.name, '')), lower(?)))",
                [Value::Text(search.to_string()), Value::Text(search.to_string())],
            );
        }

        sql
    }
}
