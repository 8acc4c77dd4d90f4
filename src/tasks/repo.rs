use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::tasks::dto::{TaskFilter, TaskPayload};

/// Progress state of a task. Canonical names appear in JSON; the database
/// stores the lowercase `task_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

/// Task record in the database. User references are restricted on delete;
/// the team reference cascades. `team_id = NULL` means "no team".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assigned_to_user_id: Uuid,
    pub created_by_user_id: Uuid,
    pub team_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const TASK_COLUMNS: &str = "id, title, description, status, assigned_to_user_id, \
     created_by_user_id, team_id, due_date, created_at";

impl Task {
    /// Filtered list; the filters are independent and combinable. Due-date
    /// equality compares the calendar date in UTC, ignoring time-of-day.
    pub async fn list(db: &PgPool, filter: &TaskFilter) -> anyhow::Result<Vec<Task>> {
        let mut qb = QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks WHERE TRUE"));
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(assignee) = filter.assigned_to_user_id {
            qb.push(" AND assigned_to_user_id = ").push_bind(assignee);
        }
        if let Some(team_id) = filter.team_id {
            qb.push(" AND team_id = ").push_bind(team_id);
        }
        if let Some(date) = filter.due_date {
            qb.push(" AND (due_date AT TIME ZONE 'UTC')::date = ")
                .push_bind(date);
        }
        qb.push(" ORDER BY created_at");

        let tasks = qb.build_query_as::<Task>().fetch_all(db).await?;
        Ok(tasks)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    pub async fn create(db: &PgPool, payload: &TaskPayload) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, description, status, assigned_to_user_id,
                               created_by_user_id, team_id, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(payload.title.trim())
        .bind(payload.description.as_deref())
        .bind(payload.status)
        .bind(payload.assigned_to_user_id)
        .bind(payload.created_by_user_id)
        .bind(payload.team_id)
        .bind(payload.due_date)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    /// Full replace of every mutable field. Returns false when the task does
    /// not exist.
    pub async fn update(db: &PgPool, id: Uuid, payload: &TaskPayload) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, assigned_to_user_id = $5,
                created_by_user_id = $6, team_id = $7, due_date = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.title.trim())
        .bind(payload.description.as_deref())
        .bind(payload.status)
        .bind(payload.assigned_to_user_id)
        .bind(payload.created_by_user_id)
        .bind(payload.team_id)
        .bind(payload.due_date)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Status-only write used for the assigned-employee path.
    pub async fn update_status(
        db: &PgPool,
        id: Uuid,
        status: TaskStatus,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE tasks SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_canonical_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"InProgress\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"Done\"").unwrap(),
            TaskStatus::Done
        );
    }
}
