use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime, parse_status, to_i64, to_u64},
    models::{SessionStatus, TaskSession},
};

const SESSION_COLUMNS: &str =
    "id, title, description, start_time, end_time, duration_seconds, status, project_id";

fn row_to_task_session(row: &Row) -> Result<TaskSession> {
    let start_time: String = row.get("start_time")?;
    let end_time: Option<String> = row.get("end_time")?;
    let duration_seconds: i64 = row.get("duration_seconds")?;
    let status: String = row.get("status")?;

    Ok(TaskSession {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        start_time: parse_datetime(&start_time, "start_time")?,
        end_time: parse_optional_datetime(end_time, "end_time")?,
        duration_seconds: to_u64(duration_seconds, "duration_seconds")?,
        status: parse_status(&status)?,
        project_id: row.get("project_id")?,
    })
}

fn load_task_session(conn: &Connection, session_id: i64) -> Result<Option<TaskSession>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM task_sessions WHERE id = ?1"
    ))?;
    let mut rows = stmt.query(params![session_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_task_session(row)?)),
        None => Ok(None),
    }
}

impl Database {
    /// Start a new session against `project_id`: in progress, zero duration, started now.
    pub async fn create_task_session(
        &self,
        title: &str,
        description: Option<&str>,
        project_id: i64,
    ) -> Result<TaskSession> {
        let title = title.to_string();
        let description = description.map(str::to_string);
        self.execute(move |conn| {
            let start_time = Utc::now();
            conn.execute(
                "INSERT INTO task_sessions (title, description, start_time, end_time, duration_seconds, status, project_id)
                 VALUES (?1, ?2, ?3, NULL, 0, ?4, ?5)",
                params![
                    title,
                    description,
                    start_time.to_rfc3339(),
                    SessionStatus::InProgress.as_str(),
                    project_id,
                ],
            )
            .with_context(|| format!("failed to insert task session for project {project_id}"))?;

            Ok(TaskSession {
                id: conn.last_insert_rowid(),
                title,
                description,
                start_time,
                end_time: None,
                duration_seconds: 0,
                status: SessionStatus::InProgress,
                project_id,
            })
        })
        .await
    }

    /// Rewrite the lifecycle fields of a session. `None` means no row has that id.
    pub async fn update_task_session(
        &self,
        session_id: i64,
        end_time: Option<DateTime<Utc>>,
        duration_seconds: u64,
        status: SessionStatus,
    ) -> Result<Option<TaskSession>> {
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE task_sessions
                 SET end_time = ?1,
                     duration_seconds = ?2,
                     status = ?3
                 WHERE id = ?4",
                params![
                    end_time.map(|dt| dt.to_rfc3339()),
                    to_i64(duration_seconds)?,
                    status.as_str(),
                    session_id,
                ],
            )?;

            if rows_affected == 0 {
                return Ok(None);
            }

            load_task_session(conn, session_id)
        })
        .await
    }

    pub async fn get_task_session(&self, session_id: i64) -> Result<Option<TaskSession>> {
        self.execute(move |conn| load_task_session(conn, session_id))
            .await
    }

    /// Sessions for one project, newest first.
    pub async fn get_sessions_for_project(&self, project_id: i64) -> Result<Vec<TaskSession>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS}
                 FROM task_sessions
                 WHERE project_id = ?1
                 ORDER BY start_time DESC, id DESC"
            ))?;

            let mut rows = stmt.query(params![project_id])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_task_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }
}
