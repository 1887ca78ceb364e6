//! Countdown clock

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ConfigurationIssue, EngineError, Result};

/// Default station length (5 minutes)
pub const DEFAULT_DURATION_SECONDS: u64 = 300;

/// Countdown state. Only [`ClockEngine`] mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub running: bool,
    pub completed: bool,
}

impl TimerState {
    /// Create a stopped timer with the full duration remaining
    pub fn new(total_seconds: u64) -> Self {
        Self {
            total_seconds,
            remaining_seconds: total_seconds,
            running: false,
            completed: false,
        }
    }

    /// Seconds counted down so far, excluding paused time
    pub fn elapsed_seconds(&self) -> u64 {
        self.total_seconds - self.remaining_seconds
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECONDS)
    }
}

/// Outcome of one effective tick, carrying the post-decrement values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub remaining_seconds: u64,
    pub elapsed_seconds: u64,
    pub running: bool,
    pub completed: bool,
}

/// Countdown clock advanced one second per external tick
#[derive(Debug, Clone, Default)]
pub struct ClockEngine {
    state: TimerState,
}

impl ClockEngine {
    /// Create a clock configured for `total_seconds`
    pub fn new(total_seconds: u64) -> Result<Self> {
        let mut clock = Self::default();
        clock.configure(total_seconds)?;
        Ok(clock)
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Set a new duration. Refused while running; leaves state untouched on error.
    pub fn configure(&mut self, total_seconds: u64) -> Result<()> {
        if total_seconds == 0 {
            return Err(EngineError::InvalidConfiguration(ConfigurationIssue::ZeroDuration));
        }
        if self.state.running {
            return Err(EngineError::InvalidConfiguration(ConfigurationIssue::TimerRunning));
        }

        self.state = TimerState::new(total_seconds);
        debug!("Clock configured for {}s", total_seconds);
        Ok(())
    }

    /// Start or pause. Does nothing once the countdown has reached zero.
    ///
    /// Returns the running flag after the call.
    pub fn start(&mut self) -> bool {
        if self.state.remaining_seconds == 0 {
            return self.state.running;
        }

        self.state.running = !self.state.running;
        if self.state.running {
            self.state.completed = false;
        }
        self.state.running
    }

    /// Stop and restore the full duration
    pub fn reset(&mut self) {
        self.state.running = false;
        self.state.completed = false;
        self.state.remaining_seconds = self.state.total_seconds;
    }

    /// Advance by exactly one second.
    ///
    /// Returns `None` when the clock is not running, so a tick delivered after
    /// a pause or reset has no effect.
    pub fn tick(&mut self) -> Option<TickEvent> {
        if !self.state.running {
            return None;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            self.state.running = false;
            self.state.completed = true;
        }

        Some(TickEvent {
            remaining_seconds: self.state.remaining_seconds,
            elapsed_seconds: self.state.elapsed_seconds(),
            running: self.state.running,
            completed: self.state.completed,
        })
    }
}
