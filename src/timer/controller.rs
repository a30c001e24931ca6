use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db::models::{NewTask, Note, Project, SessionStatus, TaskSession},
    events::{AppEvent, EventEmitter, NoticeLevel},
    log_error, log_info, log_warn,
};

use super::{
    state::{CountdownTimer, TickOutcome, TimerStatus},
    store::TaskStore,
};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Project name cannot be empty.")]
    EmptyProjectName,
    #[error("Task title cannot be empty.")]
    EmptyTaskTitle,
    #[error("Note cannot be empty.")]
    EmptyNote,
    #[error("Choose a project for the task (add one with 'a').")]
    NoProjectSelected,
    #[error("Project '{0}' could not be added.")]
    DuplicateProject(String),
    #[error("Start a task first.")]
    NoCurrentSession,
    #[error("Session {0} no longer exists; its progress was not saved.")]
    SessionMissing(i64),
    #[error("Storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for ControllerError {
    fn from(err: anyhow::Error) -> Self {
        ControllerError::Storage(err)
    }
}

impl ControllerError {
    pub fn level(&self) -> NoticeLevel {
        match self {
            ControllerError::NoCurrentSession => NoticeLevel::Info,
            ControllerError::EmptyProjectName
            | ControllerError::EmptyTaskTitle
            | ControllerError::EmptyNote
            | ControllerError::NoProjectSelected
            | ControllerError::DuplicateProject(_)
            | ControllerError::SessionMissing(_) => NoticeLevel::Warning,
            ControllerError::Storage(_) => NoticeLevel::Error,
        }
    }
}

/// Binds the "current task session" to countdown transitions and persists
/// every transition through the store.
///
/// Only the session held in `current` is ever written; once a session is
/// finished or reset the controller lets go of it.
pub struct SessionController<S: TaskStore> {
    store: S,
    timer: CountdownTimer,
    current: Option<TaskSession>,
    session_secs: u32,
    events: EventEmitter,
}

impl<S: TaskStore> SessionController<S> {
    pub fn new(store: S, session_secs: u32, events: EventEmitter) -> Self {
        Self {
            store,
            timer: CountdownTimer::new(session_secs, events.clone()),
            current: None,
            session_secs,
            events,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn current(&self) -> Option<&TaskSession> {
        self.current.as_ref()
    }

    pub async fn new_task(&mut self, task: NewTask) -> Result<TaskSession, ControllerError> {
        let title = task.title.trim();
        if title.is_empty() {
            return Err(ControllerError::EmptyTaskTitle);
        }
        let project_id = task.project_id.ok_or(ControllerError::NoProjectSelected)?;
        let description = task
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let switched = if let Some(previous) = self.current.take() {
            let elapsed = u64::from(self.timer.elapsed_secs());
            match self
                .persist(previous.id, Some(Utc::now()), elapsed, SessionStatus::Paused)
                .await
            {
                Ok(_) | Err(ControllerError::SessionMissing(_)) => {}
                Err(err) => {
                    self.current = Some(previous);
                    return Err(err);
                }
            }
            true
        } else {
            false
        };

        let session = match self
            .store
            .create_task_session(title, description, project_id)
            .await
        {
            Ok(session) => session,
            Err(err) => {
                log_error!("Failed to create session '{}': {:#}", title, err);
                // The outgoing session is already paused; stop its countdown too.
                if switched {
                    self.timer.reset();
                    self.set_current(None);
                }
                return Err(ControllerError::Storage(err));
            }
        };
        log_info!(
            "Started session {} '{}' for project {}",
            session.id,
            session.title,
            session.project_id
        );

        self.set_current(Some(session.clone()));
        self.timer.set_duration(self.session_secs);
        self.timer.start();

        Ok(session)
    }

    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.current.is_none() {
            return Err(ControllerError::NoCurrentSession);
        }
        self.timer.start();
        Ok(())
    }

    pub async fn pause(&mut self) -> Result<(), ControllerError> {
        self.timer.pause();

        let Some(session_id) = self.current.as_ref().map(|s| s.id) else {
            return Ok(());
        };

        let elapsed = u64::from(self.timer.elapsed_secs());
        match self
            .persist(session_id, Some(Utc::now()), elapsed, SessionStatus::Paused)
            .await
        {
            Ok(updated) => {
                self.set_current(Some(updated));
                Ok(())
            }
            Err(err @ ControllerError::SessionMissing(_)) => {
                self.set_current(None);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn reset(&mut self) -> Result<(), ControllerError> {
        self.timer.reset();

        let Some(session) = self.current.take() else {
            return Ok(());
        };
        self.events.emit(AppEvent::CurrentSessionChanged(None));

        self.persist(session.id, Some(Utc::now()), 0, SessionStatus::Reset)
            .await?;
        Ok(())
    }

    /// Advance the countdown by one second, completing the current session when it hits zero.
    pub async fn tick(&mut self) -> Result<TickOutcome, ControllerError> {
        let outcome = self.timer.tick();
        if outcome == TickOutcome::Finished {
            self.on_timer_finished().await?;
        }
        Ok(outcome)
    }

    /// Persist the current session as completed with the full duration.
    ///
    /// Ignored unless the timer is actually finished, so a stale notification
    /// cannot complete a session started afterwards.
    pub async fn on_timer_finished(&mut self) -> Result<Option<TaskSession>, ControllerError> {
        if self.timer.status() != TimerStatus::Finished {
            return Ok(None);
        }

        self.events.notice(NoticeLevel::Info, "Timer finished!");

        let Some(session) = self.current.take() else {
            return Ok(None);
        };
        self.events.emit(AppEvent::CurrentSessionChanged(None));

        let completed = self
            .persist(
                session.id,
                Some(Utc::now()),
                u64::from(self.timer.initial_secs()),
                SessionStatus::Completed,
            )
            .await?;
        self.events.emit(AppEvent::SessionCompleted(completed.clone()));
        Ok(Some(completed))
    }

    pub async fn add_project(&self, name: &str) -> Result<Project, ControllerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ControllerError::EmptyProjectName);
        }

        match self.store.add_project(name).await? {
            Some(project) => {
                log_info!("Added project {} '{}'", project.id, project.name);
                Ok(project)
            }
            None => Err(ControllerError::DuplicateProject(name.to_string())),
        }
    }

    pub async fn projects(&self) -> Result<Vec<Project>, ControllerError> {
        Ok(self.store.get_all_projects().await?)
    }

    pub async fn sessions_for_project(
        &self,
        project_id: i64,
    ) -> Result<Vec<TaskSession>, ControllerError> {
        Ok(self.store.get_sessions_for_project(project_id).await?)
    }

    /// Attach a note to the current session.
    pub async fn add_note(&self, content: &str) -> Result<Note, ControllerError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ControllerError::EmptyNote);
        }
        let session = self
            .current
            .as_ref()
            .ok_or(ControllerError::NoCurrentSession)?;

        Ok(self.store.add_note(session.id, content).await?)
    }

    pub async fn current_notes(&self) -> Result<Vec<Note>, ControllerError> {
        match &self.current {
            Some(session) => Ok(self.store.get_notes_for_session(session.id).await?),
            None => Ok(Vec::new()),
        }
    }

    fn set_current(&mut self, session: Option<TaskSession>) {
        self.current = session.clone();
        self.events.emit(AppEvent::CurrentSessionChanged(session));
    }

    async fn persist(
        &self,
        session_id: i64,
        end_time: Option<DateTime<Utc>>,
        duration_seconds: u64,
        status: SessionStatus,
    ) -> Result<TaskSession, ControllerError> {
        let updated = self
            .store
            .update_task_session(session_id, end_time, duration_seconds, status)
            .await
            .map_err(|err| {
                log_error!("Failed to persist session {}: {:#}", session_id, err);
                ControllerError::Storage(err)
            })?;

        match updated {
            Some(session) => {
                log_info!(
                    "Session {} is now {} after {}s",
                    session.id,
                    session.status.as_str(),
                    session.duration_seconds
                );
                Ok(session)
            }
            None => {
                log_warn!(
                    "Session {} vanished before it could be marked {}",
                    session_id,
                    status.as_str()
                );
                Err(ControllerError::SessionMissing(session_id))
            }
        }
    }
}
