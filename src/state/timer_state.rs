//! Timer snapshot published to observers

use serde::{Deserialize, Serialize};

use crate::{
    engine::{TimerState, WARNING_THRESHOLD_SECONDS},
    utils::format_clock,
};

/// Presenter view of the countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub elapsed_seconds: u64,
    pub running: bool,
    pub completed: bool,
    pub progress_percent: f64,
    pub display: String,
    /// Running with the remaining time at or below the warning threshold
    pub warning: bool,
}

impl From<TimerState> for TimerSnapshot {
    fn from(state: TimerState) -> Self {
        let elapsed_seconds = state.elapsed_seconds();
        let progress_percent = if state.total_seconds > 0 {
            elapsed_seconds as f64 / state.total_seconds as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_seconds: state.total_seconds,
            remaining_seconds: state.remaining_seconds,
            elapsed_seconds,
            running: state.running,
            completed: state.completed,
            progress_percent,
            display: format_clock(state.remaining_seconds),
            warning: state.running
                && state.remaining_seconds > 0
                && state.remaining_seconds <= WARNING_THRESHOLD_SECONDS,
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        TimerState::default().into()
    }
}
