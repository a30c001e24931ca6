use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::db::{
    models::{Note, Project, SessionStatus, TaskSession},
    Database,
};

/// Storage operations the session controller depends on.
///
/// The controller is generic over this trait so tests can swap the SQLite
/// database for an in-memory store.
#[allow(async_fn_in_trait)]
pub trait TaskStore {
    /// `None` when a project with that name already exists or the insert lost a race.
    async fn add_project(&self, name: &str) -> Result<Option<Project>>;

    async fn get_all_projects(&self) -> Result<Vec<Project>>;

    async fn create_task_session(
        &self,
        title: &str,
        description: Option<&str>,
        project_id: i64,
    ) -> Result<TaskSession>;

    /// `None` when no session has `session_id`.
    async fn update_task_session(
        &self,
        session_id: i64,
        end_time: Option<DateTime<Utc>>,
        duration_seconds: u64,
        status: SessionStatus,
    ) -> Result<Option<TaskSession>>;

    async fn get_sessions_for_project(&self, project_id: i64) -> Result<Vec<TaskSession>>;

    async fn add_note(&self, session_id: i64, content: &str) -> Result<Note>;

    async fn get_notes_for_session(&self, session_id: i64) -> Result<Vec<Note>>;
}

impl TaskStore for Database {
    async fn add_project(&self, name: &str) -> Result<Option<Project>> {
        Database::add_project(self, name).await
    }

    async fn get_all_projects(&self) -> Result<Vec<Project>> {
        Database::get_all_projects(self).await
    }

    async fn create_task_session(
        &self,
        title: &str,
        description: Option<&str>,
        project_id: i64,
    ) -> Result<TaskSession> {
        Database::create_task_session(self, title, description, project_id).await
    }

    async fn update_task_session(
        &self,
        session_id: i64,
        end_time: Option<DateTime<Utc>>,
        duration_seconds: u64,
        status: SessionStatus,
    ) -> Result<Option<TaskSession>> {
        Database::update_task_session(self, session_id, end_time, duration_seconds, status).await
    }

    async fn get_sessions_for_project(&self, project_id: i64) -> Result<Vec<TaskSession>> {
        Database::get_sessions_for_project(self, project_id).await
    }

    async fn add_note(&self, session_id: i64, content: &str) -> Result<Note> {
        Database::add_note(self, session_id, content).await
    }

    async fn get_notes_for_session(&self, session_id: i64) -> Result<Vec<Note>> {
        Database::get_notes_for_session(self, session_id).await
    }
}
