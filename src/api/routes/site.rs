//! Public page views. Every request reads a fresh snapshot.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{
    build_match_detail, build_schedule, build_standings, build_team_profile, MatchDetail,
    Schedule, StandingsRow, StatsView, TeamProfile,
};
use crate::models::Snapshot;
use crate::storage::load_snapshot;

fn snapshot(state: &AppState) -> Result<Snapshot, ApiError> {
    load_snapshot(&state.storage).map_err(|e| ApiError::Internal(format!("数据加载失败: {}", e)))
}

pub async fn schedule(State(state): State<AppState>) -> Result<Json<Schedule>, ApiError> {
    let snapshot = snapshot(&state)?;
    Ok(Json(build_schedule(&snapshot)))
}

pub async fn standings(
    State(state): State<AppState>,
) -> Result<Json<Vec<StandingsRow>>, ApiError> {
    let snapshot = snapshot(&state)?;
    Ok(Json(build_standings(&snapshot.teams, &snapshot.matches)))
}

#[derive(Debug, Deserialize)]
pub struct MatchDetailParams {
    pub map: Option<String>,
}

pub async fn match_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<MatchDetailParams>,
) -> Result<Json<MatchDetail>, ApiError> {
    let view: StatsView = params
        .map
        .as_deref()
        .unwrap_or("all")
        .parse()
        .map_err(ApiError::BadRequest)?;

    tracing::debug!("Match detail {} view {:?}", id, view);
    let snapshot = snapshot(&state)?;
    build_match_detail(&snapshot, &id, view)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("比赛不存在: {}", id)))
}

pub async fn team_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TeamProfile>, ApiError> {
    tracing::debug!("Team profile {}", id);
    let snapshot = snapshot(&state)?;
    build_team_profile(&snapshot, &id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("战队不存在: {}", id)))
}
