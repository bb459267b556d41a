//! Integration tests against a DuckDB file
//!
//! Tests the full flow: seeded database → record store → paginator → service/HTTP

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use recipe_pager::cli::{router, AppState, VIEWER_HEADER};
use recipe_pager::config::PaginationConfig;
use recipe_pager::database::Database;
use recipe_pager::domain::{Recipe, RecipeQuery, RecipeView, Role, User, UserFilter, Viewer};
use recipe_pager::service::{RecipeService, UserService};
use recipe_pager::{MissingCursorPolicy, Page, PageParams};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

// ============================================================================
// Fixtures
// ============================================================================

fn at(n: usize) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::minutes(n as i64)
}

/// A database file holding 25 public recipes (`recipe-01` oldest) and 3 users
async fn seeded_db(dir: &TempDir) -> Database {
    let path = dir.path().join("recipes.duckdb");
    let db = Database::open(path.to_str().unwrap()).unwrap();

    for n in 1..=3 {
        db.insert_user(
            User::new(format!("cook{n}@example.com"))
                .with_id(format!("user-{n}"))
                .with_role(if n == 1 { Role::Admin } else { Role::User })
                .created_at(at(n)),
        )
        .await
        .unwrap();
    }

    for n in 1..=25 {
        let mut recipe = Recipe::new(format!("user-{}", n % 3 + 1), format!("Recipe {n}"))
            .with_id(format!("recipe-{n:02}"))
            .with_times(Some(n as i64), Some(30))
            .created_at(at(n));
        if n % 2 == 0 {
            recipe = recipe.with_tags(["vegan"]).with_ingredients(["tofu", "rice"]);
        }
        db.insert_recipe(recipe).await.unwrap();
    }

    db
}

fn recipe_service(db: &Database, policy: MissingCursorPolicy) -> RecipeService {
    RecipeService::new(Arc::new(db.recipes(policy)), PaginationConfig::default())
}

fn params(cursor: Option<&str>, take: usize) -> PageParams {
    PageParams::new(cursor.map(str::to_string), Some(take))
}

fn ids(page: &Page<RecipeView>) -> Vec<String> {
    page.data.iter().map(|r| r.id.clone()).collect()
}

fn expected(from: usize, to: usize) -> Vec<String> {
    (to..=from).rev().map(|n| format!("recipe-{n:02}")).collect()
}

/// Follow cursors until the last page, returning every id seen
async fn traverse(service: &RecipeService, query: &RecipeQuery, take: usize) -> Vec<String> {
    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = service
            .list(None, query.clone(), &params(cursor.as_deref(), take))
            .await
            .unwrap();
        seen.extend(ids(&page));
        match page.next_cursor {
            Some(next) => cursor = Some(next.into_inner()),
            None => return seen,
        }
    }
}

// ============================================================================
// Traversal
// ============================================================================

#[tokio::test]
async fn test_three_page_walkthrough() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    let service = recipe_service(&db, MissingCursorPolicy::Restart);
    let query = RecipeQuery::default();

    let first = service.list(None, query.clone(), &params(None, 10)).await.unwrap();
    assert_eq!(ids(&first), expected(25, 16));
    assert_eq!(first.next_cursor.as_ref().map(|c| c.as_str()), Some("recipe-16"));
    assert_eq!(first.total, Some(25));

    let second = service
        .list(None, query.clone(), &params(Some("recipe-16"), 10))
        .await
        .unwrap();
    assert_eq!(ids(&second), expected(15, 6));
    assert_eq!(second.next_cursor.as_ref().map(|c| c.as_str()), Some("recipe-06"));
    assert_eq!(second.total, Some(25));

    let third = service
        .list(None, query, &params(Some("recipe-06"), 10))
        .await
        .unwrap();
    assert_eq!(ids(&third), expected(5, 1));
    assert!(third.next_cursor.is_none());
    assert_eq!(third.total, Some(25));
}

#[tokio::test]
async fn test_traversal_is_exhaustive_for_every_take() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    let service = recipe_service(&db, MissingCursorPolicy::Restart);

    for take in [1, 4, 5, 24, 25, 100] {
        let seen = traverse(&service, &RecipeQuery::default(), take).await;
        let unique: HashSet<&String> = seen.iter().collect();

        assert_eq!(seen, expected(25, 1), "take {take}");
        assert_eq!(unique.len(), seen.len(), "take {take}");
    }
}

#[tokio::test]
async fn test_filtered_traversal_matches_total() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    let service = recipe_service(&db, MissingCursorPolicy::Restart);
    let query = RecipeQuery {
        tags: vec!["vegan".into()],
        ingredients: vec!["tofu".into()],
        max_prep_time: Some(20),
        ..RecipeQuery::default()
    };

    let first = service.list(None, query.clone(), &params(None, 3)).await.unwrap();
    let seen = traverse(&service, &query, 3).await;

    assert_eq!(first.total, Some(10));
    assert_eq!(seen.len(), 10);
    assert_eq!(seen.first().map(String::as_str), Some("recipe-20"));
    assert_eq!(seen.last().map(String::as_str), Some("recipe-02"));
}

// ============================================================================
// Concurrent writes
// ============================================================================

#[tokio::test]
async fn test_deleted_record_ahead_of_cursor_is_skipped() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    let service = recipe_service(&db, MissingCursorPolicy::Restart);

    service.list(None, RecipeQuery::default(), &params(None, 10)).await.unwrap();
    assert!(db.delete_recipe("recipe-12").await.unwrap());

    let second = service
        .list(None, RecipeQuery::default(), &params(Some("recipe-16"), 10))
        .await
        .unwrap();

    assert_eq!(
        ids(&second),
        vec![
            "recipe-15", "recipe-14", "recipe-13", "recipe-11", "recipe-10", "recipe-09",
            "recipe-08", "recipe-07", "recipe-06", "recipe-05"
        ]
    );
    assert_eq!(second.total, Some(24));
}

#[tokio::test]
async fn test_newer_insert_does_not_disturb_later_pages() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    let service = recipe_service(&db, MissingCursorPolicy::Restart);

    service.list(None, RecipeQuery::default(), &params(None, 10)).await.unwrap();
    db.insert_recipe(
        Recipe::new("user-1", "Fresh Bread")
            .with_id("recipe-26")
            .created_at(at(26)),
    )
    .await
    .unwrap();

    let second = service
        .list(None, RecipeQuery::default(), &params(Some("recipe-16"), 10))
        .await
        .unwrap();

    assert_eq!(ids(&second), expected(15, 6));
    assert_eq!(second.total, Some(26));
}

#[tokio::test]
async fn test_deleted_cursor_restarts_from_beginning() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    let service = recipe_service(&db, MissingCursorPolicy::Restart);

    db.delete_recipe("recipe-16").await.unwrap();
    let page = service
        .list(None, RecipeQuery::default(), &params(Some("recipe-16"), 10))
        .await
        .unwrap();

    let mut want = expected(25, 17);
    want.push("recipe-15".into());
    assert_eq!(ids(&page), want);
    assert_eq!(page.next_cursor.as_ref().map(|c| c.as_str()), Some("recipe-15"));
}

#[tokio::test]
async fn test_deleted_cursor_exhausted_policy() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    let service = recipe_service(&db, MissingCursorPolicy::Exhausted);

    db.delete_recipe("recipe-16").await.unwrap();
    let page = service
        .list(None, RecipeQuery::default(), &params(Some("recipe-16"), 10))
        .await
        .unwrap();

    assert!(page.is_empty());
    assert!(page.next_cursor.is_none());
    assert_eq!(page.total, Some(24));
}

// ============================================================================
// Visibility, users and persistence
// ============================================================================

#[tokio::test]
async fn test_private_recipes_only_reach_their_author() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    db.insert_recipe(
        Recipe::new("user-2", "Grandma's Stew")
            .with_id("stew")
            .private()
            .created_at(at(30)),
    )
    .await
    .unwrap();
    let service = recipe_service(&db, MissingCursorPolicy::Restart);

    let anonymous = service
        .list(None, RecipeQuery::default(), &params(None, 1))
        .await
        .unwrap();
    assert_eq!(ids(&anonymous), vec!["recipe-25"]);
    assert_eq!(anonymous.total, Some(25));

    let author = Viewer::new("user-2");
    let own = service
        .list(Some(&author), RecipeQuery::default(), &params(None, 1))
        .await
        .unwrap();
    assert_eq!(ids(&own), vec!["stew"]);
    assert_eq!(own.total, Some(26));
}

#[tokio::test]
async fn test_users_listing() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    let service = UserService::new(
        Arc::new(db.users(MissingCursorPolicy::Restart)),
        PaginationConfig::default(),
    );

    let page = service
        .list(UserFilter::default(), &PageParams::default())
        .await
        .unwrap();
    let ids: Vec<&str> = page.data.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["user-3", "user-2", "user-1"]);
    assert!(page.next_cursor.is_none());

    let admins = UserFilter {
        role: Some(Role::Admin),
        search: None,
    };
    let page = service.list(admins, &PageParams::default()).await.unwrap();
    assert_eq!(page.total, Some(1));
    assert_eq!(page.data[0].email, "cook1@example.com");
}

#[tokio::test]
async fn test_reopened_database_keeps_cursors_valid() {
    let dir = TempDir::new().unwrap();
    let path = {
        let db = seeded_db(&dir).await;
        db.path().to_string()
    };

    let db = Database::open(&path).unwrap();
    let service = recipe_service(&db, MissingCursorPolicy::Restart);
    let page = service
        .list(None, RecipeQuery::default(), &params(Some("recipe-06"), 10))
        .await
        .unwrap();

    assert_eq!(ids(&page), expected(5, 1));
}

// ============================================================================
// HTTP over DuckDB
// ============================================================================

#[tokio::test]
async fn test_http_recipes_over_duckdb() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir).await;
    let policy = MissingCursorPolicy::Restart;
    let app = router(AppState {
        recipes: recipe_service(&db, policy),
        users: UserService::new(Arc::new(db.users(policy)), PaginationConfig::default()),
    });

    let request = Request::builder()
        .uri("/recipes?take=2&cursor=recipe-10&tags=vegan")
        .header(VIEWER_HEADER, "user-1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["data"][0]["id"], "recipe-08");
    assert_eq!(body["data"]["data"][1]["id"], "recipe-06");
    assert_eq!(body["data"]["nextCursor"], "recipe-06");
    assert_eq!(body["data"]["total"], 12);
    assert_eq!(body["data"]["data"][0]["tags"], serde_json::json!(["vegan"]));
}
