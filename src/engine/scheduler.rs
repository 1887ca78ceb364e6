//! Announcements keyed by elapsed time

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{EngineError, Result};
use super::session::AnnouncementSink;

/// Opaque announcement identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnouncementId(Uuid);

impl AnnouncementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnnouncementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnnouncementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AnnouncementId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A message spoken once when the elapsed time reaches `fire_at_seconds`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub text: String,
    pub fire_at_seconds: u64,
    pub fired: bool,
}

/// Ordered set of announcements. Insertion order is kept so that entries
/// sharing a fire time are delivered first-added, first-delivered.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementScheduler {
    entries: Vec<Announcement>,
}

impl AnnouncementScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an announcement. `fire_at_seconds` must lie in `(0, total_seconds]`.
    pub fn add(&mut self, text: &str, fire_at_seconds: u64, total_seconds: u64) -> Result<AnnouncementId> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::InvalidAnnouncement("text must not be empty".to_string()));
        }
        if fire_at_seconds == 0 || fire_at_seconds > total_seconds {
            return Err(EngineError::InvalidAnnouncement(format!(
                "fire time {}s is outside (0, {}]",
                fire_at_seconds, total_seconds
            )));
        }

        let id = AnnouncementId::new();
        self.entries.push(Announcement {
            id,
            text: text.to_string(),
            fire_at_seconds,
            fired: false,
        });
        debug!("Announcement {} scheduled at {}s", id, fire_at_seconds);
        Ok(id)
    }

    /// Remove an announcement. Unknown ids are ignored.
    pub fn remove(&mut self, id: &AnnouncementId) -> bool {
        let initial_count = self.entries.len();
        self.entries.retain(|entry| entry.id != *id);
        self.entries.len() != initial_count
    }

    pub fn get(&self, id: &AnnouncementId) -> Option<&Announcement> {
        self.entries.iter().find(|entry| entry.id == *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire every unfired entry whose fire time equals `elapsed_seconds`.
    ///
    /// Matching is exact: an entry whose time is jumped over never fires.
    pub fn on_elapsed_changed(&mut self, elapsed_seconds: u64, sink: &mut dyn AnnouncementSink) -> usize {
        let mut fired = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| !entry.fired && entry.fire_at_seconds == elapsed_seconds)
        {
            entry.fired = true;
            fired += 1;
            info!("Announcement {} fired at {}s", entry.id, elapsed_seconds);
            sink.announce(&entry.id, &entry.text);
        }
        fired
    }

    /// Unfired entries due strictly after `elapsed_seconds`, soonest first
    pub fn upcoming(&self, elapsed_seconds: u64, limit: usize) -> impl Iterator<Item = &Announcement> + '_ {
        let mut pending: Vec<&Announcement> = self
            .entries
            .iter()
            .filter(|entry| !entry.fired && entry.fire_at_seconds > elapsed_seconds)
            .collect();
        pending.sort_by_key(|entry| entry.fire_at_seconds);
        pending.into_iter().take(limit)
    }

    /// All entries sorted by fire time, ties in insertion order
    pub fn list(&self) -> Vec<Announcement> {
        let mut all = self.entries.clone();
        all.sort_by_key(|entry| entry.fire_at_seconds);
        all
    }

    /// Clear the fired flag on every entry
    pub fn rearm(&mut self) {
        for entry in &mut self.entries {
            entry.fired = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::session::FiredAnnouncement;

    #[test]
    fn add_rejects_empty_text() {
        let mut scheduler = AnnouncementScheduler::new();
        assert!(matches!(
            scheduler.add("   ", 10, 300),
            Err(EngineError::InvalidAnnouncement(_))
        ));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn add_rejects_out_of_range_times() {
        let mut scheduler = AnnouncementScheduler::new();
        assert!(matches!(scheduler.add("Start", 0, 300), Err(EngineError::InvalidAnnouncement(_))));
        assert!(matches!(scheduler.add("Late", 301, 300), Err(EngineError::InvalidAnnouncement(_))));
        assert!(scheduler.add("End", 300, 300).is_ok());
    }

    #[test]
    fn add_trims_text_and_allows_shared_times() {
        let mut scheduler = AnnouncementScheduler::new();
        let a = scheduler.add("  Halfway  ", 150, 300).unwrap();
        let b = scheduler.add("Halfway again", 150, 300).unwrap();
        assert_ne!(a, b);
        assert_eq!(scheduler.get(&a).unwrap().text, "Halfway");
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut scheduler = AnnouncementScheduler::new();
        let id = scheduler.add("Bye", 5, 10).unwrap();
        assert!(scheduler.remove(&id));
        assert!(!scheduler.remove(&id));
        assert!(!scheduler.remove(&AnnouncementId::new()));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn fires_on_exact_match_only_once() {
        let mut scheduler = AnnouncementScheduler::new();
        let id = scheduler.add("Two minutes left", 3, 10).unwrap();
        let mut sink: Vec<FiredAnnouncement> = Vec::new();

        assert_eq!(scheduler.on_elapsed_changed(2, &mut sink), 0);
        assert_eq!(scheduler.on_elapsed_changed(3, &mut sink), 1);
        assert_eq!(scheduler.on_elapsed_changed(3, &mut sink), 0);
        assert_eq!(scheduler.on_elapsed_changed(4, &mut sink), 0);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].id, id);
        assert!(scheduler.get(&id).unwrap().fired);
    }

    #[test]
    fn skipped_time_never_fires() {
        let mut scheduler = AnnouncementScheduler::new();
        scheduler.add("Missed", 5, 10).unwrap();
        let mut sink: Vec<FiredAnnouncement> = Vec::new();

        scheduler.on_elapsed_changed(4, &mut sink);
        scheduler.on_elapsed_changed(6, &mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn shared_fire_time_delivers_in_insertion_order() {
        let mut scheduler = AnnouncementScheduler::new();
        let first = scheduler.add("first", 7, 10).unwrap();
        scheduler.add("other", 2, 10).unwrap();
        let second = scheduler.add("second", 7, 10).unwrap();
        let mut sink: Vec<FiredAnnouncement> = Vec::new();

        scheduler.on_elapsed_changed(7, &mut sink);
        let ids: Vec<_> = sink.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn upcoming_is_sorted_filtered_and_truncated() {
        let mut scheduler = AnnouncementScheduler::new();
        scheduler.add("c", 90, 300).unwrap();
        scheduler.add("a", 30, 300).unwrap();
        scheduler.add("b", 60, 300).unwrap();
        scheduler.add("d", 120, 300).unwrap();
        let mut sink: Vec<FiredAnnouncement> = Vec::new();
        scheduler.on_elapsed_changed(30, &mut sink);

        let texts: Vec<_> = scheduler.upcoming(30, 2).map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);

        let texts: Vec<_> = scheduler.upcoming(0, 10).map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "d"]);

        assert_eq!(scheduler.upcoming(120, 3).count(), 0);
    }

    #[test]
    fn rearm_allows_firing_again() {
        let mut scheduler = AnnouncementScheduler::new();
        scheduler.add("again", 1, 10).unwrap();
        let mut sink: Vec<FiredAnnouncement> = Vec::new();

        scheduler.on_elapsed_changed(1, &mut sink);
        scheduler.rearm();
        scheduler.on_elapsed_changed(1, &mut sink);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn list_orders_by_fire_time() {
        let mut scheduler = AnnouncementScheduler::new();
        scheduler.add("late", 200, 300).unwrap();
        scheduler.add("early", 20, 300).unwrap();
        let list = scheduler.list();
        assert_eq!(list[0].text, "early");
        assert_eq!(list[1].text, "late");
    }
}
