use crate::db::models::{NewTask, Note, Project, TaskSession};

use super::{
    controller::{ControllerError, SessionController},
    store::TaskStore,
};

/// A user trigger coming from a key binding or a confirmed dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    NewTask(NewTask),
    AddProject(String),
    AddNote(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Done,
    TaskStarted(TaskSession),
    ProjectAdded(Project),
    NoteAdded(Note),
}

pub async fn dispatch<S: TaskStore>(
    controller: &mut SessionController<S>,
    command: Command,
) -> Result<CommandOutcome, ControllerError> {
    match command {
        Command::Start => {
            controller.start()?;
            Ok(CommandOutcome::Done)
        }
        Command::Pause => {
            controller.pause().await?;
            Ok(CommandOutcome::Done)
        }
        Command::Reset => {
            controller.reset().await?;
            Ok(CommandOutcome::Done)
        }
        Command::NewTask(task) => controller
            .new_task(task)
            .await
            .map(CommandOutcome::TaskStarted),
        Command::AddProject(name) => controller
            .add_project(&name)
            .await
            .map(CommandOutcome::ProjectAdded),
        Command::AddNote(content) => controller
            .add_note(&content)
            .await
            .map(CommandOutcome::NoteAdded),
    }
}
