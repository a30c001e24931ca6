use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::error;
use ratatui::widgets::ListState;

use crate::{
    db::models::{NewTask, Note, Project, TaskSession},
    events::{AppEvent, NoticeLevel},
    settings::Settings,
    timer::{dispatch, Command, CommandOutcome, SessionController, TaskStore, TickOutcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    /// Index into the project list; `None` when there are no projects.
    pub project_index: Option<usize>,
    pub field: TaskField,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    AddProject { name: String, error: Option<String> },
    NewTask(TaskForm),
    AddNote { content: String, error: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Front-end state: everything the renderer reads plus the controller it drives.
pub struct App<S: TaskStore> {
    controller: SessionController<S>,
    settings: Settings,
    pub projects: Vec<Project>,
    pub project_state: ListState,
    pub history: Vec<TaskSession>,
    pub notes: Vec<Note>,
    pub timer_text: String,
    pub notice: Option<Notice>,
    pub dialog: Option<Dialog>,
    should_quit: bool,
    needs_reload: bool,
    bell_pending: bool,
    restart_ticker: bool,
    /// Project to select on the next reload, e.g. one that was just added.
    pending_selection: Option<i64>,
}

impl<S: TaskStore> App<S> {
    pub fn new(controller: SessionController<S>, settings: Settings) -> Self {
        let timer_text = controller.timer().display();
        Self {
            controller,
            settings,
            projects: Vec::new(),
            project_state: ListState::default(),
            history: Vec::new(),
            notes: Vec::new(),
            timer_text,
            notice: None,
            dialog: None,
            should_quit: false,
            needs_reload: true,
            bell_pending: false,
            restart_ticker: false,
            pending_selection: None,
        }
    }

    pub fn controller(&self) -> &SessionController<S> {
        &self.controller
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    pub fn take_ticker_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_ticker)
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.project_state
            .selected()
            .and_then(|index| self.projects.get(index))
    }

    /// Re-read projects, the selected project's history and the current session's notes.
    pub async fn reload(&mut self) {
        self.needs_reload = false;

        let selected_id = self
            .pending_selection
            .take()
            .or_else(|| self.selected_project().map(|p| p.id));
        match self.controller.projects().await {
            Ok(projects) => self.projects = projects,
            Err(err) => self.report(err.level(), err.to_string()),
        }
        let index = selected_id
            .and_then(|id| self.projects.iter().position(|p| p.id == id))
            .or(if self.projects.is_empty() { None } else { Some(0) });
        self.project_state.select(index);

        self.history = match self.selected_project().map(|p| p.id) {
            Some(project_id) => match self.controller.sessions_for_project(project_id).await {
                Ok(history) => history,
                Err(err) => {
                    self.report(err.level(), err.to_string());
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        match self.controller.current_notes().await {
            Ok(notes) => self.notes = notes,
            Err(err) => self.report(err.level(), err.to_string()),
        }
    }

    pub async fn on_tick(&mut self) {
        match self.controller.tick().await {
            Ok(TickOutcome::Finished) => self.needs_reload = true,
            Ok(_) => {}
            Err(err) => {
                self.needs_reload = true;
                self.report(err.level(), err.to_string());
            }
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TimerDisplay(text) => self.timer_text = text,
            AppEvent::TimerFinished => self.bell_pending = self.settings.bell_on_finish,
            AppEvent::CurrentSessionChanged(_) => self.needs_reload = true,
            AppEvent::SessionCompleted(session) => {
                self.needs_reload = true;
                self.report(
                    NoticeLevel::Info,
                    format!(
                        "Completed '{}' ({} min)",
                        session.title,
                        session.duration_seconds / 60
                    ),
                );
            }
            AppEvent::Notice { level, message } => self.report(level, message),
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if let Some(command) = self.command_for_key(key) {
            self.run_command(command).await;
        }
    }

    async fn run_command(&mut self, command: Command) {
        let starts_timer = matches!(command, Command::Start | Command::NewTask(_));

        match dispatch(&mut self.controller, command).await {
            Ok(outcome) => {
                if starts_timer {
                    self.restart_ticker = true;
                }
                match outcome {
                    CommandOutcome::Done => {}
                    CommandOutcome::TaskStarted(session) => {
                        self.report(NoticeLevel::Info, format!("Started '{}'", session.title))
                    }
                    CommandOutcome::ProjectAdded(project) => {
                        self.report(
                            NoticeLevel::Info,
                            format!("Project '{}' added", project.name),
                        );
                        self.needs_reload = true;
                        self.pending_selection = Some(project.id);
                    }
                    CommandOutcome::NoteAdded(_) => self.needs_reload = true,
                }
            }
            Err(err) => {
                if err.level() == NoticeLevel::Error {
                    error!("Command failed: {err}");
                }
                self.needs_reload = true;
                self.report(err.level(), err.to_string());
            }
        }
    }

    /// Translate a key press into a command, updating dialog state along the way.
    pub fn command_for_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match self.dialog.take() {
            Some(dialog) => self.dialog_key(dialog, key),
            None => self.normal_key(key),
        }
    }

    fn normal_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('s') => Some(Command::Start),
            KeyCode::Char('p') => Some(Command::Pause),
            KeyCode::Char('r') => Some(Command::Reset),
            KeyCode::Char('a') => {
                self.dialog = Some(Dialog::AddProject {
                    name: String::new(),
                    error: None,
                });
                None
            }
            KeyCode::Char('n') => {
                self.dialog = Some(Dialog::NewTask(TaskForm {
                    title: String::new(),
                    description: String::new(),
                    project_index: self.project_state.selected(),
                    field: TaskField::Title,
                    error: None,
                }));
                None
            }
            KeyCode::Char('o') => {
                if self.controller.current().is_some() {
                    self.dialog = Some(Dialog::AddNote {
                        content: String::new(),
                        error: None,
                    });
                } else {
                    self.report(NoticeLevel::Info, "Start a task first.");
                }
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                None
            }
            _ => None,
        }
    }

    fn dialog_key(&mut self, dialog: Dialog, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Esc {
            return None;
        }

        match dialog {
            Dialog::AddProject { mut name, error } => {
                if key.code == KeyCode::Enter {
                    if name.trim().is_empty() {
                        self.dialog = Some(Dialog::AddProject {
                            name,
                            error: Some("Project name cannot be empty.".into()),
                        });
                        return None;
                    }
                    return Some(Command::AddProject(name));
                }
                edit_text(&mut name, key);
                self.dialog = Some(Dialog::AddProject { name, error });
                None
            }
            Dialog::AddNote { mut content, error } => {
                if key.code == KeyCode::Enter {
                    if content.trim().is_empty() {
                        self.dialog = Some(Dialog::AddNote {
                            content,
                            error: Some("Note cannot be empty.".into()),
                        });
                        return None;
                    }
                    return Some(Command::AddNote(content));
                }
                edit_text(&mut content, key);
                self.dialog = Some(Dialog::AddNote { content, error });
                None
            }
            Dialog::NewTask(form) => self.task_form_key(form, key),
        }
    }

    fn task_form_key(&mut self, mut form: TaskForm, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                if form.title.trim().is_empty() {
                    form.error = Some("Task title cannot be empty.".into());
                } else if form.project_index.is_none() {
                    form.error = Some("Add a project first (press 'a').".into());
                } else {
                    let project_id = form
                        .project_index
                        .and_then(|index| self.projects.get(index))
                        .map(|p| p.id);
                    let description = Some(form.description).filter(|d| !d.trim().is_empty());
                    return Some(Command::NewTask(NewTask {
                        title: form.title,
                        description,
                        project_id,
                    }));
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                form.field = match form.field {
                    TaskField::Title => TaskField::Description,
                    TaskField::Description => TaskField::Title,
                };
            }
            KeyCode::Left => form.project_index = cycle(form.project_index, self.projects.len(), -1),
            KeyCode::Right => form.project_index = cycle(form.project_index, self.projects.len(), 1),
            _ => match form.field {
                TaskField::Title => edit_text(&mut form.title, key),
                TaskField::Description => edit_text(&mut form.description, key),
            },
        }
        self.dialog = Some(Dialog::NewTask(form));
        None
    }

    fn move_selection(&mut self, delta: isize) {
        let next = cycle(self.project_state.selected(), self.projects.len(), delta);
        if next != self.project_state.selected() {
            self.project_state.select(next);
            self.needs_reload = true;
        }
    }

    fn report(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            message: message.into(),
        });
    }
}

fn edit_text(buffer: &mut String, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => buffer.push(c),
        KeyCode::Backspace => {
            buffer.pop();
        }
        _ => {}
    }
}

/// Move a wrapping list index by `delta`; `None` for an empty list.
fn cycle(current: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.unwrap_or(0).min(len - 1) as isize;
    Some((current + delta).rem_euclid(len as isize) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{models::SessionStatus, Database},
        events::{drain, EventEmitter, EventReceiver},
        timer::TimerStatus,
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(app: &mut App<Database>, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).await;
        }
    }

    async fn app() -> (tempfile::TempDir, App<Database>, EventReceiver) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("tasky.db")).unwrap();
        let (events, rx) = EventEmitter::channel();
        let controller = SessionController::new(db, 90, events);
        let mut app = App::new(controller, Settings::default());
        app.reload().await;
        (dir, app, rx)
    }

    fn pump(app: &mut App<Database>, rx: &mut EventReceiver) {
        for event in drain(rx) {
            app.handle_event(event);
        }
    }

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle(None, 0, 1), None);
        assert_eq!(cycle(Some(2), 3, 1), Some(0));
        assert_eq!(cycle(Some(0), 3, -1), Some(2));
        assert_eq!(cycle(None, 3, 1), Some(1));
    }

    #[tokio::test]
    async fn empty_project_name_stays_in_dialog() {
        let (_dir, mut app, _rx) = app().await;

        app.handle_key(key(KeyCode::Char('a'))).await;
        app.handle_key(key(KeyCode::Char(' '))).await;
        app.handle_key(key(KeyCode::Enter)).await;

        match &app.dialog {
            Some(Dialog::AddProject { error, .. }) => {
                assert_eq!(error.as_deref(), Some("Project name cannot be empty."))
            }
            other => panic!("dialog closed unexpectedly: {other:?}"),
        }
        app.reload().await;
        assert!(app.projects.is_empty());
    }

    #[tokio::test]
    async fn add_project_then_duplicate_notice() {
        let (_dir, mut app, _rx) = app().await;

        for _ in 0..2 {
            app.handle_key(key(KeyCode::Char('a'))).await;
            type_text(&mut app, "Writing").await;
            app.handle_key(key(KeyCode::Enter)).await;
            app.reload().await;
        }

        assert!(app.dialog.is_none());
        assert_eq!(app.projects.len(), 1);
        assert_eq!(app.selected_project().map(|p| p.name.as_str()), Some("Writing"));
        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Project 'Writing' could not be added.");
    }

    #[tokio::test]
    async fn task_dialog_needs_a_project_and_a_title() {
        let (_dir, mut app, _rx) = app().await;

        app.handle_key(key(KeyCode::Char('n'))).await;
        app.handle_key(key(KeyCode::Enter)).await;
        let Some(Dialog::NewTask(form)) = &app.dialog else {
            panic!("task dialog should stay open");
        };
        assert_eq!(form.error.as_deref(), Some("Task title cannot be empty."));

        type_text(&mut app, "Draft").await;
        app.handle_key(key(KeyCode::Enter)).await;
        let Some(Dialog::NewTask(form)) = &app.dialog else {
            panic!("task dialog should stay open");
        };
        assert_eq!(form.error.as_deref(), Some("Add a project first (press 'a')."));
        assert!(app.controller().current().is_none());
    }

    #[tokio::test]
    async fn key_bindings_drive_the_session() {
        let (_dir, mut app, mut rx) = app().await;
        app.handle_key(key(KeyCode::Char('a'))).await;
        type_text(&mut app, "Writing").await;
        app.handle_key(key(KeyCode::Enter)).await;
        app.reload().await;

        app.handle_key(key(KeyCode::Char('n'))).await;
        type_text(&mut app, "Draft").await;
        app.handle_key(key(KeyCode::Tab)).await;
        type_text(&mut app, "intro").await;
        app.handle_key(key(KeyCode::Enter)).await;
        assert!(app.take_ticker_restart());

        let session = app.controller().current().cloned().unwrap();
        assert_eq!(session.title, "Draft");
        assert_eq!(session.description.as_deref(), Some("intro"));
        assert_eq!(app.controller().timer().status(), TimerStatus::Running);

        for _ in 0..3 {
            app.on_tick().await;
        }
        app.handle_key(key(KeyCode::Char('p'))).await;
        pump(&mut app, &mut rx);
        assert_eq!(app.timer_text, "01:27");

        app.handle_key(key(KeyCode::Char('o'))).await;
        type_text(&mut app, "outline").await;
        app.handle_key(key(KeyCode::Enter)).await;
        app.reload().await;
        assert_eq!(app.notes.len(), 1);
        assert_eq!(app.history[0].status, SessionStatus::Paused);
        assert_eq!(app.history[0].duration_seconds, 3);

        app.handle_key(key(KeyCode::Char('s'))).await;
        for _ in 0..87 {
            app.on_tick().await;
        }
        pump(&mut app, &mut rx);
        assert!(app.take_bell());
        assert!(app.needs_reload());
        app.reload().await;
        assert_eq!(app.history[0].status, SessionStatus::Completed);
        assert_eq!(app.history[0].duration_seconds, 90);
        assert!(app.controller().current().is_none());
        assert!(app.notes.is_empty());

        app.handle_key(key(KeyCode::Char('s'))).await;
        assert_eq!(app.notice.clone().unwrap().level, NoticeLevel::Info);
        assert_eq!(app.notice.clone().unwrap().message, "Start a task first.");

        app.handle_key(key(KeyCode::Char('q'))).await;
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn escape_closes_dialog_without_changes() {
        let (_dir, mut app, _rx) = app().await;
        app.handle_key(key(KeyCode::Char('a'))).await;
        type_text(&mut app, "Side").await;
        app.handle_key(key(KeyCode::Esc)).await;

        assert!(app.dialog.is_none());
        app.reload().await;
        assert!(app.projects.is_empty());
    }
}
