//! Countdown engine
//!
//! Synchronous core of the timer: the countdown clock, the announcement
//! scheduler, the cue decision logic and the session that ties them together.
//! Nothing in here performs I/O or waits on a real clock.

pub mod clock;
pub mod cues;
pub mod error;
pub mod scheduler;
pub mod session;

// Re-export main types
pub use clock::{ClockEngine, TickEvent, TimerState};
pub use cues::{Cue, CueDispatcher, WARNING_THRESHOLD_SECONDS};
pub use error::{ConfigurationIssue, EngineError, Result};
pub use scheduler::{Announcement, AnnouncementId, AnnouncementScheduler};
pub use session::{AnnouncementSink, CueSink, ExamSession, FiredAnnouncement};
