//! Admin access to the raw data documents.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::auth::AdminAuth;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::storage::{read_document, write_document, DataDocument};

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub ok: bool,
}

fn read(state: &AppState, document: DataDocument) -> Result<Json<Value>, ApiError> {
    Ok(Json(read_document(&state.storage, document)?))
}

fn save(state: &AppState, document: DataDocument, payload: &Value) -> Result<Json<SaveResponse>, ApiError> {
    write_document(&state.storage, document, payload)?;
    Ok(Json(SaveResponse { ok: true }))
}

pub async fn get_teams(_auth: AdminAuth, State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    read(&state, DataDocument::Teams)
}

pub async fn save_teams(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<SaveResponse>, ApiError> {
    save(&state, DataDocument::Teams, &payload)
}

pub async fn get_matches(_auth: AdminAuth, State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    read(&state, DataDocument::Matches)
}

pub async fn save_matches(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<SaveResponse>, ApiError> {
    save(&state, DataDocument::Matches, &payload)
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_requires_token() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/teams").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_get_teams() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = admin_get(app, "/api/teams").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["teams"]["t1"]["name"], "Alpha");
    }

    #[tokio::test]
    async fn test_save_matches_then_view() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());

        let payload = json!({"matches": [
            {"id": "x1", "status": "completed", "teams": {"a": "t2", "b": "t1"},
             "score": {"a": 1, "b": 0}}
        ]});
        let (status, json) = admin_post(build_router(state.clone()), "/api/matches", &payload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);

        let (_, json) = get_json(build_router(state.clone()), "/api/standings").await;
        assert_eq!(json[0]["team"]["name"], "Bravo");

        let (_, json) = admin_get(build_router(state), "/api/matches").await;
        assert_eq!(json["matches"][0]["id"], "x1");
    }

    #[tokio::test]
    async fn test_save_rejects_wrong_root_key() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup_test_state(tmp.path());

        let (status, json) =
            admin_post(build_router(state.clone()), "/api/teams", &json!({"matches": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (_, json) = admin_get(build_router(state), "/api/teams").await;
        assert_eq!(json["teams"]["t2"]["name"], "Bravo");
    }
}
