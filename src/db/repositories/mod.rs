mod notes;
mod projects;
mod task_sessions;
