//! Exam session: clock, announcements and cues evaluated together

use serde::{Deserialize, Serialize};

use super::{
    clock::{ClockEngine, TickEvent, TimerState},
    cues::{Cue, CueDispatcher},
    error::Result,
    scheduler::{Announcement, AnnouncementId, AnnouncementScheduler},
};

/// Receives fired announcements, synchronously and in firing order
pub trait AnnouncementSink {
    fn announce(&mut self, id: &AnnouncementId, text: &str);
}

/// Receives cues chosen for a tick
pub trait CueSink {
    fn cue(&mut self, cue: Cue);
}

/// An announcement delivered by a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredAnnouncement {
    pub id: AnnouncementId,
    pub text: String,
}

impl AnnouncementSink for Vec<FiredAnnouncement> {
    fn announce(&mut self, id: &AnnouncementId, text: &str) {
        self.push(FiredAnnouncement {
            id: *id,
            text: text.to_string(),
        });
    }
}

impl CueSink for Vec<Cue> {
    fn cue(&mut self, cue: Cue) {
        self.push(cue);
    }
}

/// One OSCE station countdown with its scheduled announcements
#[derive(Debug, Clone, Default)]
pub struct ExamSession {
    clock: ClockEngine,
    scheduler: AnnouncementScheduler,
    cues: CueDispatcher,
}

impl ExamSession {
    pub fn new(total_seconds: u64) -> Result<Self> {
        Ok(Self {
            clock: ClockEngine::new(total_seconds)?,
            scheduler: AnnouncementScheduler::new(),
            cues: CueDispatcher::default(),
        })
    }

    pub fn timer(&self) -> TimerState {
        self.clock.state()
    }

    /// Change the duration; announcements are re-armed for the new run
    pub fn configure(&mut self, total_seconds: u64) -> Result<()> {
        self.clock.configure(total_seconds)?;
        self.scheduler.rearm();
        Ok(())
    }

    /// Start/pause toggle, returns whether the clock is now running
    pub fn start(&mut self) -> bool {
        self.clock.start()
    }

    /// Restore the full duration and re-arm every announcement
    pub fn reset(&mut self) {
        self.clock.reset();
        self.scheduler.rearm();
    }

    /// Advance one second and fan the result out to both sinks.
    ///
    /// Announcements and cues are evaluated against the same post-decrement
    /// value, each exactly once. Returns `None` when the clock is not running.
    pub fn tick(
        &mut self,
        announcements: &mut dyn AnnouncementSink,
        cues: &mut dyn CueSink,
        tick_enabled: bool,
    ) -> Option<TickEvent> {
        let previous_remaining = self.clock.state().remaining_seconds;
        let event = self.clock.tick()?;

        self.scheduler.on_elapsed_changed(event.elapsed_seconds, announcements);
        for cue in self.cues.evaluate(previous_remaining, &event, tick_enabled) {
            cues.cue(cue);
        }

        Some(event)
    }

    pub fn add_announcement(&mut self, text: &str, fire_at_seconds: u64) -> Result<AnnouncementId> {
        let total = self.clock.state().total_seconds;
        self.scheduler.add(text, fire_at_seconds, total)
    }

    pub fn remove_announcement(&mut self, id: &AnnouncementId) -> bool {
        self.scheduler.remove(id)
    }

    pub fn announcement(&self, id: &AnnouncementId) -> Option<&Announcement> {
        self.scheduler.get(id)
    }

    pub fn announcements(&self) -> Vec<Announcement> {
        self.scheduler.list()
    }

    /// Next unfired announcements after the current elapsed time
    pub fn upcoming(&self, limit: usize) -> Vec<Announcement> {
        let elapsed = self.clock.state().elapsed_seconds();
        self.scheduler.upcoming(elapsed, limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::{ConfigurationIssue, EngineError};

    fn run(session: &mut ExamSession, ticks: usize) -> (Vec<FiredAnnouncement>, Vec<Cue>) {
        let mut fired = Vec::new();
        let mut cues = Vec::new();
        for _ in 0..ticks {
            session.tick(&mut fired, &mut cues, true);
        }
        (fired, cues)
    }

    #[test]
    fn halfway_announcement_fires_once_at_150() {
        let mut session = ExamSession::new(300).unwrap();
        session.add_announcement("Halfway", 150).unwrap();
        session.start();

        let (fired, _) = run(&mut session, 149);
        assert!(fired.is_empty());

        let (fired, _) = run(&mut session, 1);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].text, "Halfway");
        assert_eq!(session.timer().remaining_seconds, 150);

        let (fired, _) = run(&mut session, 150);
        assert!(fired.is_empty());
    }

    #[test]
    fn ten_second_run_completes_with_one_completion_cue() {
        let mut session = ExamSession::new(10).unwrap();
        session.start();

        let (_, cues) = run(&mut session, 15);
        let timer = session.timer();
        assert_eq!(timer.remaining_seconds, 0);
        assert!(!timer.running);
        assert!(timer.completed);
        assert_eq!(cues.iter().filter(|c| **c == Cue::Completion).count(), 1);
        assert_eq!(cues.iter().filter(|c| **c == Cue::Tick).count(), 9);
    }

    #[test]
    fn warning_fires_once_per_run() {
        let mut session = ExamSession::new(60).unwrap();
        session.start();
        let (_, cues) = run(&mut session, 60);
        assert_eq!(cues.iter().filter(|c| **c == Cue::Warning).count(), 1);
    }

    #[test]
    fn announcement_at_zero_is_rejected() {
        let mut session = ExamSession::new(300).unwrap();
        assert!(matches!(
            session.add_announcement("Begin", 0),
            Err(EngineError::InvalidAnnouncement(_))
        ));
    }

    #[test]
    fn configure_while_running_fails() {
        let mut session = ExamSession::new(300).unwrap();
        session.start();
        run(&mut session, 3);
        let before = session.timer();

        assert_eq!(
            session.configure(120),
            Err(EngineError::InvalidConfiguration(ConfigurationIssue::TimerRunning))
        );
        assert_eq!(session.timer(), before);
    }

    #[test]
    fn reset_rearms_fired_announcements() {
        let mut session = ExamSession::new(10).unwrap();
        session.add_announcement("Ping", 2).unwrap();
        session.start();
        let (fired, _) = run(&mut session, 2);
        assert_eq!(fired.len(), 1);

        session.reset();
        assert!(!session.announcements()[0].fired);
        session.start();
        let (fired, _) = run(&mut session, 2);
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn configure_rearms_fired_announcements() {
        let mut session = ExamSession::new(10).unwrap();
        session.add_announcement("Ping", 2).unwrap();
        session.start();
        let (fired, _) = run(&mut session, 3);
        assert_eq!(fired.len(), 1);

        // Pause, then change the duration
        session.start();
        session.configure(20).unwrap();
        assert!(!session.announcements()[0].fired);
        assert_eq!(session.timer().remaining_seconds, 20);

        session.start();
        let (fired, _) = run(&mut session, 2);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].text, "Ping");
    }

    #[test]
    fn paused_session_ignores_ticks() {
        let mut session = ExamSession::new(10).unwrap();
        session.add_announcement("Ping", 1).unwrap();
        let (fired, cues) = run(&mut session, 5);
        assert!(fired.is_empty());
        assert!(cues.is_empty());
        assert_eq!(session.timer().remaining_seconds, 10);
    }

    #[test]
    fn upcoming_tracks_elapsed_time() {
        let mut session = ExamSession::new(100).unwrap();
        session.add_announcement("a", 10).unwrap();
        session.add_announcement("b", 20).unwrap();
        session.add_announcement("c", 30).unwrap();
        session.add_announcement("d", 40).unwrap();
        session.start();
        run(&mut session, 10);

        let upcoming: Vec<_> = session.upcoming(3).into_iter().map(|a| a.text).collect();
        assert_eq!(upcoming, vec!["b", "c", "d"]);
    }
}
