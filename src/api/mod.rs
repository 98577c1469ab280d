//! REST API endpoints.
//!
//! Axum-based HTTP API serving the public page views, the admin data
//! documents and admin site-file editing, next to the static site itself.

pub mod auth;
pub mod routes;
pub mod state;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower::util::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::storage::StorageError;

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PathNotFound(path) => ApiError::NotFound(path.display().to_string()),
            StorageError::InvalidPath(path) => ApiError::Forbidden(path),
            StorageError::Disallowed(path) => ApiError::Forbidden(path),
            StorageError::InvalidDocument(msg) => ApiError::BadRequest(msg),
            err @ StorageError::DigestMismatch { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        "*" => layer.allow_origin(Any),
        other => match HeaderValue::from_str(other) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", other);
                layer
            }
        },
    }
}

/// Serve a file from the site root, if the editor rules would list it.
/// Anything else (config, dotfiles, ignored dirs) is a plain 404.
async fn static_file(State(state): State<AppState>, request: Request) -> Response {
    let public = urlencoding::decode(request.uri().path())
        .map(|path| state.files.is_public(&path))
        .unwrap_or(false);
    if !public {
        tracing::debug!("Refused static path {}", request.uri().path());
        return StatusCode::NOT_FOUND.into_response();
    }

    let files = ServeDir::new(&state.storage.site_root).append_index_html_on_directories(true);
    match files.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    build_router_with_options(state, false)
}

/// Build the router, optionally logging every request.
pub fn build_router_with_options(state: AppState, access_log: bool) -> Router {
    use routes::{data, files, site};

    let site_root = state.storage.site_root.clone();
    let cors = cors_layer(&state.cors_origin);

    let router = Router::new()
        // Public views
        .route("/api/schedule", get(site::schedule))
        .route("/api/standings", get(site::standings))
        .route("/api/matches/:id", get(site::match_detail))
        .route("/api/teams/:id", get(site::team_profile))
        // Admin data documents
        .route("/api/teams", get(data::get_teams).post(data::save_teams))
        .route("/api/matches", get(data::get_matches).post(data::save_matches))
        // Admin site files
        .route("/api/fs/list", get(files::list_files))
        .route("/api/fs/file", get(files::read_file).post(files::write_file))
        .route_service("/admin", ServeFile::new(site_root.join("admin.html")))
        .fallback(static_file)
        .with_state(state)
        .layer(cors);

    if access_log {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}
