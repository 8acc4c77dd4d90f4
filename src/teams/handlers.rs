use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::CurrentUser,
        policy::{ensure_allowed, Operation},
    },
    error::ApiError,
    state::AppState,
    teams::{dto::TeamPayload, repo::Team},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route(
            "/teams/:id",
            get(get_team).put(update_team).delete(delete_team),
        )
}

#[instrument(skip(state, current))]
pub async fn list_teams(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
) -> Result<Json<Vec<Team>>, ApiError> {
    ensure_allowed(current.role, Operation::Read)?;
    let teams = Team::list(&state.db).await?;
    Ok(Json(teams))
}

#[instrument(skip(state, current))]
pub async fn get_team(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Team>, ApiError> {
    ensure_allowed(current.role, Operation::Read)?;
    let team = Team::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(team))
}

#[instrument(skip(state, current, payload))]
pub async fn create_team(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Json(payload): Json<TeamPayload>,
) -> Result<(StatusCode, HeaderMap, Json<Team>), ApiError> {
    ensure_allowed(current.role, Operation::CreateTeam)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidRequest("Team name is required".into()));
    }

    let team = Team::create(&state.db, name, payload.description.as_deref()).await?;
    info!(team_id = %team.id, name = %team.name, "team created");

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/teams/{}", team.id).parse().unwrap(),
    );
    Ok((StatusCode::CREATED, headers, Json(team)))
}

#[instrument(skip(state, current, payload))]
pub async fn update_team(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TeamPayload>,
) -> Result<StatusCode, ApiError> {
    ensure_allowed(current.role, Operation::UpdateTeam)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidRequest("Team name is required".into()));
    }

    let found = Team::update(&state.db, id, name, payload.description.as_deref()).await?;
    if !found {
        return Err(ApiError::NotFound);
    }
    info!(team_id = %id, "team updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Deleting a team also removes its tasks (FK cascade).
#[instrument(skip(state, current))]
pub async fn delete_team(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_allowed(current.role, Operation::DeleteTeam)?;

    let found = Team::delete(&state.db, id).await?;
    if !found {
        return Err(ApiError::NotFound);
    }
    info!(team_id = %id, "team deleted");
    Ok(StatusCode::NO_CONTENT)
}
