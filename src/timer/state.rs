use crate::events::{AppEvent, EventEmitter};

/// Twenty-five minutes.
pub const DEFAULT_DURATION_SECS: u32 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or paused: nothing changed.
    Ignored,
    Counted,
    /// This tick took the countdown to zero.
    Finished,
}

/// One-second countdown driven by an external ticker.
///
/// Every change to the remaining time emits [`AppEvent::TimerDisplay`]; reaching
/// zero while running emits [`AppEvent::TimerFinished`] exactly once.
#[derive(Debug)]
pub struct CountdownTimer {
    status: TimerStatus,
    remaining_secs: u32,
    initial_secs: u32,
    events: EventEmitter,
}

impl CountdownTimer {
    pub fn new(initial_secs: u32, events: EventEmitter) -> Self {
        debug_assert!(initial_secs > 0, "countdown duration must be positive");
        Self {
            status: TimerStatus::Idle,
            remaining_secs: initial_secs,
            initial_secs,
            events,
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn initial_secs(&self) -> u32 {
        self.initial_secs
    }

    /// Seconds counted down since the last reset.
    pub fn elapsed_secs(&self) -> u32 {
        self.initial_secs.saturating_sub(self.remaining_secs)
    }

    /// Running or paused: a countdown is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self.status, TimerStatus::Running | TimerStatus::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.status == TimerStatus::Paused
    }

    pub fn display(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }

    pub fn set_duration(&mut self, seconds: u32) {
        debug_assert!(seconds > 0, "countdown duration must be positive");
        self.initial_secs = seconds;
        self.reset();
    }

    pub fn start(&mut self) {
        match self.status {
            TimerStatus::Idle | TimerStatus::Paused => self.status = TimerStatus::Running,
            TimerStatus::Running | TimerStatus::Finished => {}
        }
    }

    pub fn pause(&mut self) {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Paused;
        }
    }

    pub fn reset(&mut self) {
        self.status = TimerStatus::Idle;
        self.remaining_secs = self.initial_secs;
        self.emit_display();
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.status != TimerStatus::Running {
            return TickOutcome::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.emit_display();

        if self.remaining_secs == 0 {
            self.status = TimerStatus::Finished;
            self.events.emit(AppEvent::TimerFinished);
            return TickOutcome::Finished;
        }

        TickOutcome::Counted
    }

    fn emit_display(&self) {
        self.events.emit(AppEvent::TimerDisplay(self.display()));
    }
}

pub fn format_mm_ss(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
