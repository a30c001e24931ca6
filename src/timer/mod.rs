pub mod commands;
pub mod controller;
pub mod state;
pub mod store;

pub use commands::{dispatch, Command, CommandOutcome};
pub use controller::{ControllerError, SessionController};
pub use state::{CountdownTimer, TickOutcome, TimerStatus, DEFAULT_DURATION_SECS};
pub use store::TaskStore;
