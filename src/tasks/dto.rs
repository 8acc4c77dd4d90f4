use serde::Deserialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::tasks::repo::TaskStatus;

/// Body for task create and full-replace update. Callers resend the whole
/// entity; absent optional fields overwrite with "none".
#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assigned_to_user_id: Uuid,
    pub created_by_user_id: Uuid,
    #[serde(default)]
    pub team_id: Option<Uuid>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

/// Independent, combinable list filters. `due_date` matches by calendar
/// date (`YYYY-MM-DD`), ignoring time-of-day.
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub assigned_to_user_id: Option<Uuid>,
    #[serde(default)]
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub due_date: Option<Date>,
}
