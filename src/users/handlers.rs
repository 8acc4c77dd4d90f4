use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::CurrentUser,
        password::hash_password,
        policy::{ensure_allowed, Operation},
    },
    error::{is_fk_violation, is_unique_violation, ApiError},
    state::AppState,
    users::{
        dto::{is_valid_email, CreateUserRequest, UpdateUserRequest},
        repo::User,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, current))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
) -> Result<Json<Vec<User>>, ApiError> {
    ensure_allowed(current.role, Operation::Read)?;
    let users = User::list(&state.db).await?;
    Ok(Json(users))
}

#[instrument(skip(state, current))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    ensure_allowed(current.role, Operation::Read)?;
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(user))
}

#[instrument(skip(state, current, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, HeaderMap, Json<User>), ApiError> {
    ensure_allowed(current.role, Operation::CreateUser)?;

    payload.email = payload.email.trim().to_lowercase();
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Full name is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::InvalidRequest("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::InvalidRequest("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        payload.full_name.trim(),
        &payload.email,
        payload.role,
        &hash,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Email already registered".into())
        } else {
            ApiError::from(e)
        }
    })?;

    info!(user_id = %user.id, email = %user.email, "user created");

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/users/{}", user.id).parse().unwrap(),
    );
    Ok((StatusCode::CREATED, headers, Json(user)))
}

#[instrument(skip(state, current, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<StatusCode, ApiError> {
    ensure_allowed(current.role, Operation::UpdateUser)?;

    payload.email = payload.email.trim().to_lowercase();
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Full name is required".into()));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::InvalidRequest("Invalid email".into()));
    }

    let found = User::update(
        &state.db,
        id,
        payload.full_name.trim(),
        &payload.email,
        payload.role,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Email already registered".into())
        } else {
            ApiError::from(e)
        }
    })?;

    if !found {
        return Err(ApiError::NotFound);
    }
    info!(user_id = %id, "user updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_allowed(current.role, Operation::DeleteUser)?;

    let found = User::delete(&state.db, id).await.map_err(|e| {
        if is_fk_violation(&e) {
            ApiError::Conflict("User is referenced by existing tasks".into())
        } else {
            ApiError::from(e)
        }
    })?;

    if !found {
        return Err(ApiError::NotFound);
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
