//! HTTP server mode for the list endpoints

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::{Query, QueryRejection};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::domain::{RecipeQuery, RecipeView, UserFilter, UserView, Viewer};
use crate::error::{Error, Result};
use crate::pagination::{Page, PageParams};
use crate::service::{RecipeService, UserService};

/// Header carrying the caller's user id
///
/// Stands in for session authentication, which lives outside this service.
pub const VIEWER_HEADER: &str = "x-user-id";

/// App state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub recipes: RecipeService,
    pub users: UserService,
}

/// Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            status: "success",
            data: Some(data),
            message: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            status: "error",
            data: None,
            message: Some(msg.into()),
        }
    }
}

/// An [`Error`] rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::invalid_request(rejection.to_string()))
    }
}

/// HTTP status for an error
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        e if e.is_store_failure() => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }
        (status, Json(ApiResponse::<()>::error(self.0.to_string()))).into_response()
    }
}

/// The optional caller, read from [`VIEWER_HEADER`]
#[derive(Debug, Clone)]
pub struct OptionalViewer(pub Option<Viewer>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for OptionalViewer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let viewer = parts
            .headers
            .get(VIEWER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(Viewer::new);
        Ok(Self(viewer))
    }
}

/// Build the router (without CORS)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/recipes", get(list_recipes))
        .route("/users", get(list_users))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server and run until Ctrl-C
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        Error::invalid_config("server.cors_origin", format!("'{}': {e}", config.cors_origin))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Starting HTTP server on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Any unknown path, answered in the error envelope
async fn route_not_found(uri: Uri) -> ApiError {
    ApiError(Error::not_found("Route", uri.path()))
}

/// GET /recipes?cursor=&take=&search=&tags=...
///
/// Wrapped in the success envelope. `tags` and `ingredients` may be
/// comma-separated, repeated, or both.
async fn list_recipes(
    State(state): State<Arc<AppState>>,
    OptionalViewer(viewer): OptionalViewer,
    page: std::result::Result<Query<PageParams>, QueryRejection>,
    query: std::result::Result<Query<RecipeQuery>, QueryRejection>,
) -> std::result::Result<Json<ApiResponse<Page<RecipeView>>>, ApiError> {
    let Query(page) = page?;
    let Query(query) = query?;

    let result = state.recipes.list(viewer.as_ref(), query, &page).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// GET /users?cursor=&take=&role=&search=
///
/// Returns the bare page.
async fn list_users(
    State(state): State<Arc<AppState>>,
    page: std::result::Result<Query<PageParams>, QueryRejection>,
    query: std::result::Result<Query<UserFilter>, QueryRejection>,
) -> std::result::Result<Json<Page<UserView>>, ApiError> {
    let Query(page) = page?;
    let Query(query) = query?;

    Ok(Json(state.users.list(query, &page).await?))
}
