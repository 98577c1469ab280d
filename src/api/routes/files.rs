//! Admin editing of site files under the site root.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::auth::AdminAuth;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::storage::SiteFile;

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileParams {
    pub path: Option<String>,
}

impl FileParams {
    fn required(&self) -> Result<&str, ApiError> {
        self.path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("missing path".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct WriteFileRequest {
    pub content: String,
    /// Digest of the content the editor started from
    #[serde(default)]
    pub digest: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WriteFileResponse {
    pub ok: bool,
    pub path: String,
    pub digest: String,
}

pub async fn list_files(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<FileListResponse>, ApiError> {
    let files = state.files.list()?;
    Ok(Json(FileListResponse { files }))
}

pub async fn read_file(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
) -> Result<Json<SiteFile>, ApiError> {
    Ok(Json(state.files.read(params.required()?)?))
}

pub async fn write_file(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
    Json(req): Json<WriteFileRequest>,
) -> Result<Json<WriteFileResponse>, ApiError> {
    let path = params.required()?;
    let digest = state
        .files
        .write(path, &req.content, req.digest.as_deref())?;
    Ok(Json(WriteFileResponse {
        ok: true,
        path: path.trim_start_matches('/').to_string(),
        digest,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use crate::storage::content_digest;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_files() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = admin_get(app, "/api/fs/list").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["files"],
            json!(["admin.html", "data/matches.json", "data/teams.json", "index.html"])
        );
    }

    #[tokio::test]
    async fn test_read_and_write_file() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());

        let (status, json) = admin_get(build_router(state.clone()), "/api/fs/file?path=index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["content"], "<h1>BHML</h1>");
        let digest = json["digest"].as_str().unwrap().to_string();

        let body = json!({"content": "<h1>New</h1>", "digest": digest});
        let (status, json) =
            admin_post(build_router(state.clone()), "/api/fs/file?path=index.html", &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["digest"], content_digest("<h1>New</h1>"));

        // Same stale digest again
        let (status, json) =
            admin_post(build_router(state), "/api/fs/file?path=index.html", &body).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());

        let (status, _) =
            admin_get(build_router(state.clone()), "/api/fs/file?path=../etc/passwd.txt").await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = admin_post(
            build_router(state.clone()),
            "/api/fs/file?path=run.sh",
            &json!({"content": "rm -rf /"}),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = admin_get(build_router(state), "/api/fs/file").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_requires_token() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, _) = get_json(app, "/api/fs/list").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
