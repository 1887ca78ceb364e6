//! Audio cue decisions per tick

use serde::{Deserialize, Serialize};

use super::clock::TickEvent;

/// Remaining time at which the warning beep sounds
pub const WARNING_THRESHOLD_SECONDS: u64 = 30;

/// Short audio signal distinct from a spoken announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Periodic per-second tick
    Tick,
    /// Single beep when the remaining time drops to the threshold
    Warning,
    /// Rising three-tone sequence when the countdown ends
    Completion,
}

/// Decides which cues one tick produces
#[derive(Debug, Clone, Copy)]
pub struct CueDispatcher {
    pub warning_threshold: u64,
}

impl CueDispatcher {
    pub fn new(warning_threshold: u64) -> Self {
        Self { warning_threshold }
    }

    /// Cues for a tick that moved the clock from `previous_remaining` to `event`.
    ///
    /// Tick and warning can both occur on the same tick.
    pub fn evaluate(&self, previous_remaining: u64, event: &TickEvent, tick_enabled: bool) -> Vec<Cue> {
        let mut cues = Vec::with_capacity(2);

        if event.running && tick_enabled {
            cues.push(Cue::Tick);
        }
        if previous_remaining > self.warning_threshold && event.remaining_seconds <= self.warning_threshold {
            cues.push(Cue::Warning);
        }
        if event.completed {
            cues.push(Cue::Completion);
        }

        cues
    }
}

impl Default for CueDispatcher {
    fn default() -> Self {
        Self::new(WARNING_THRESHOLD_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(remaining: u64, total: u64) -> TickEvent {
        TickEvent {
            remaining_seconds: remaining,
            elapsed_seconds: total - remaining,
            running: remaining > 0,
            completed: remaining == 0,
        }
    }

    #[test]
    fn tick_only_when_enabled() {
        let dispatcher = CueDispatcher::default();
        assert_eq!(dispatcher.evaluate(100, &event(99, 300), true), vec![Cue::Tick]);
        assert!(dispatcher.evaluate(100, &event(99, 300), false).is_empty());
    }

    #[test]
    fn warning_on_threshold_crossing_alongside_tick() {
        let dispatcher = CueDispatcher::default();
        assert_eq!(
            dispatcher.evaluate(31, &event(30, 300), true),
            vec![Cue::Tick, Cue::Warning]
        );
        assert_eq!(dispatcher.evaluate(31, &event(30, 300), false), vec![Cue::Warning]);
        // Already below the threshold
        assert_eq!(dispatcher.evaluate(30, &event(29, 300), true), vec![Cue::Tick]);
    }

    #[test]
    fn short_countdown_never_warns() {
        let dispatcher = CueDispatcher::default();
        let cues = dispatcher.evaluate(20, &event(19, 20), true);
        assert!(!cues.contains(&Cue::Warning));
    }

    #[test]
    fn completion_replaces_tick_on_last_second() {
        let dispatcher = CueDispatcher::default();
        assert_eq!(dispatcher.evaluate(1, &event(0, 10), true), vec![Cue::Completion]);
    }
}
