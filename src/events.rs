//! Events flowing from the timer and the session controller to the front end.
//!
//! Producers hold an [`EventEmitter`]; the UI loop owns the receiving half and
//! drains it between redraws. Emitting never fails: if the receiver is gone the
//! event is dropped, the same way a window that has closed stops listening.

use tokio::sync::mpsc;

use crate::db::models::TaskSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Remaining time changed; carries the `MM:SS` text to show.
    TimerDisplay(String),
    /// The countdown reached zero while running.
    TimerFinished,
    /// The session the controller tracks as current was replaced or cleared.
    CurrentSessionChanged(Option<TaskSession>),
    /// A finished session was persisted as completed.
    SessionCompleted(TaskSession),
    Notice { level: NoticeLevel, message: String },
}

pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventEmitter {
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    pub fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.emit(AppEvent::Notice {
            level,
            message: message.into(),
        });
    }
}

/// Drain everything currently queued. Handy for tests and for batching redraws.
pub fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
