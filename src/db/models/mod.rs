pub mod note;
pub mod project;
pub mod session;

pub use note::Note;
pub use project::Project;
pub use session::{NewTask, SessionStatus, TaskSession};
