use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::CurrentUser,
        policy::{authorize, ensure_allowed, Decision, Operation},
    },
    error::{is_fk_violation, ApiError},
    state::AppState,
    tasks::{
        dto::{TaskFilter, TaskPayload},
        repo::Task,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

/// True when the payload differs from the stored task in the status field
/// at most. This is what an assigned Employee is allowed to send.
fn is_status_only_change(existing: &Task, incoming: &TaskPayload) -> bool {
    incoming.title.trim() == existing.title
        && incoming.description == existing.description
        && incoming.assigned_to_user_id == existing.assigned_to_user_id
        && incoming.created_by_user_id == existing.created_by_user_id
        && incoming.team_id == existing.team_id
        && incoming.due_date == existing.due_date
}

fn reference_error(e: anyhow::Error) -> ApiError {
    if is_fk_violation(&e) {
        ApiError::InvalidRequest("Assigned user, creator or team does not exist".into())
    } else {
        ApiError::from(e)
    }
}

#[instrument(skip(state, current))]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, ApiError> {
    ensure_allowed(current.role, Operation::Read)?;
    let tasks = Task::list(&state.db, &filter).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state, current))]
pub async fn get_task(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    ensure_allowed(current.role, Operation::Read)?;
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(task))
}

#[instrument(skip(state, current, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, HeaderMap, Json<Task>), ApiError> {
    ensure_allowed(current.role, Operation::CreateTask)?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Title is required".into()));
    }

    let task = Task::create(&state.db, &payload)
        .await
        .map_err(reference_error)?;
    info!(task_id = %task.id, created_by = %current.id, "task created");

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/tasks/{}", task.id).parse().unwrap(),
    );
    Ok((StatusCode::CREATED, headers, Json(task)))
}

#[instrument(skip(state, current, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaskPayload>,
) -> Result<StatusCode, ApiError> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let operation = Operation::UpdateTask {
        requester_is_assignee: task.assigned_to_user_id == current.id,
    };
    match authorize(current.role, operation) {
        Decision::Allow => {
            if payload.title.trim().is_empty() {
                return Err(ApiError::InvalidRequest("Title is required".into()));
            }
            Task::update(&state.db, id, &payload)
                .await
                .map_err(reference_error)?;
            info!(task_id = %id, user_id = %current.id, "task updated");
        }
        Decision::AllowStatusOnly => {
            if !is_status_only_change(&task, &payload) {
                warn!(task_id = %id, user_id = %current.id, "assignee attempted non-status change");
                return Err(ApiError::Forbidden);
            }
            Task::update_status(&state.db, id, payload.status).await?;
            info!(task_id = %id, user_id = %current.id, status = ?payload.status, "task status updated");
        }
        Decision::Deny => return Err(ApiError::Forbidden),
    }

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current))]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_allowed(current.role, Operation::DeleteTask)?;

    let found = Task::delete(&state.db, id).await?;
    if !found {
        return Err(ApiError::NotFound);
    }
    info!(task_id = %id, user_id = %current.id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::repo::TaskStatus;
    use time::OffsetDateTime;

    fn stored_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Ship release".into(),
            description: Some("cut the tag".into()),
            status: TaskStatus::Todo,
            assigned_to_user_id: Uuid::new_v4(),
            created_by_user_id: Uuid::new_v4(),
            team_id: None,
            due_date: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn payload_matching(task: &Task) -> TaskPayload {
        TaskPayload {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            assigned_to_user_id: task.assigned_to_user_id,
            created_by_user_id: task.created_by_user_id,
            team_id: task.team_id,
            due_date: task.due_date,
        }
    }

    #[test]
    fn status_change_alone_is_status_only() {
        let task = stored_task();
        let mut payload = payload_matching(&task);
        payload.status = TaskStatus::Done;
        assert!(is_status_only_change(&task, &payload));
    }

    #[test]
    fn unchanged_payload_is_status_only() {
        let task = stored_task();
        let payload = payload_matching(&task);
        assert!(is_status_only_change(&task, &payload));
    }

    #[test]
    fn title_change_is_not_status_only() {
        let task = stored_task();
        let mut payload = payload_matching(&task);
        payload.title = "Ship release v2".into();
        payload.status = TaskStatus::Done;
        assert!(!is_status_only_change(&task, &payload));
    }

    #[test]
    fn reassignment_is_not_status_only() {
        let task = stored_task();
        let mut payload = payload_matching(&task);
        payload.assigned_to_user_id = Uuid::new_v4();
        assert!(!is_status_only_change(&task, &payload));
    }

    #[test]
    fn team_or_due_date_change_is_not_status_only() {
        let task = stored_task();

        let mut payload = payload_matching(&task);
        payload.team_id = Some(Uuid::new_v4());
        assert!(!is_status_only_change(&task, &payload));

        let mut payload = payload_matching(&task);
        payload.due_date = Some(OffsetDateTime::UNIX_EPOCH);
        assert!(!is_status_only_change(&task, &payload));
    }

    #[test]
    fn dropping_the_description_is_not_status_only() {
        let task = stored_task();
        let mut payload = payload_matching(&task);
        payload.description = None;
        assert!(!is_status_only_change(&task, &payload));
    }
}
