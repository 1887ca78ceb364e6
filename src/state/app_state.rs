//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::TimerSnapshot;
use crate::{
    engine::{
        Announcement, AnnouncementId, Cue, EngineError, ExamSession, FiredAnnouncement, TickEvent,
    },
    services::{CuePlayer, SpeechBackend, SpeechError, Voice, speech::pick_default_voice},
    settings::{Settings, SettingsError, SettingsPatch, SettingsStore},
    utils::format_uptime,
};

#[derive(Error, Debug)]
pub enum StateError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("Announcement not found: {0}")]
    NotFound(AnnouncementId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to lock {0}")]
    LockPoisoned(&'static str),
}

/// Host capabilities the state dispatches to
#[derive(Clone)]
pub struct Capabilities {
    pub speech: Arc<dyn SpeechBackend>,
    pub cues: Arc<dyn CuePlayer>,
}

/// Running flag plus a counter bumped on every start, pause, reset and configure.
///
/// The countdown task restarts its tick source whenever the epoch moves, so a
/// pause immediately followed by a resume still discards the pending tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    pub running: bool,
    pub epoch: u64,
}

/// Shared state behind the HTTP handlers and the countdown task
pub struct AppState {
    /// Countdown and announcements
    session: Mutex<ExamSession>,
    /// User settings and where they are persisted
    settings: Mutex<Settings>,
    settings_store: SettingsStore,
    capabilities: Capabilities,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
    /// Channel for timer updates
    timer_update_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _timer_update_rx: watch::Receiver<TimerSnapshot>,
    /// Run state observed by the countdown task
    run_state_tx: watch::Sender<RunState>,
    _run_state_rx: watch::Receiver<RunState>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        session: ExamSession,
        settings: Settings,
        settings_store: SettingsStore,
        capabilities: Capabilities,
    ) -> Self {
        let timer = session.timer();
        let (timer_update_tx, timer_update_rx) = watch::channel(TimerSnapshot::from(timer));
        let (run_state_tx, run_state_rx) = watch::channel(RunState {
            running: timer.running,
            epoch: 0,
        });

        Self {
            session: Mutex::new(session),
            settings: Mutex::new(settings),
            settings_store,
            capabilities,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
            run_state_tx,
            _run_state_rx: run_state_rx,
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, ExamSession>, StateError> {
        self.session.lock().map_err(|_| StateError::LockPoisoned("session"))
    }

    fn settings_guard(&self) -> Result<MutexGuard<'_, Settings>, StateError> {
        self.settings.lock().map_err(|_| StateError::LockPoisoned("settings"))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
    }

    /// Notify timer watchers and the countdown task.
    ///
    /// `restart` marks a user action that invalidates any pending tick.
    fn publish(&self, snapshot: &TimerSnapshot, restart: bool) {
        if let Err(e) = self.timer_update_tx.send(snapshot.clone()) {
            warn!("Failed to send timer update: {}", e);
        }
        self.run_state_tx.send_if_modified(|run_state| {
            let changed = restart || run_state.running != snapshot.running;
            if restart {
                run_state.epoch = run_state.epoch.wrapping_add(1);
            }
            run_state.running = snapshot.running;
            changed
        });
    }

    /// Set a new countdown duration
    pub fn configure(&self, total_seconds: u64) -> Result<TimerSnapshot, StateError> {
        let snapshot = {
            let mut session = self.session()?;
            session.configure(total_seconds)?;
            TimerSnapshot::from(session.timer())
        };

        info!("Timer configured for {}", snapshot.display);
        self.record_action("configure");
        self.publish(&snapshot, true);
        Ok(snapshot)
    }

    /// Start or pause the countdown
    pub fn start(&self) -> Result<TimerSnapshot, StateError> {
        let snapshot = {
            let mut session = self.session()?;
            session.start();
            TimerSnapshot::from(session.timer())
        };

        info!(
            "Timer {} at {}",
            if snapshot.running { "started" } else { "paused" },
            snapshot.display
        );
        self.record_action(if snapshot.running { "start" } else { "pause" });
        self.publish(&snapshot, true);
        Ok(snapshot)
    }

    /// Stop and restore the full duration
    pub fn reset(&self) -> Result<TimerSnapshot, StateError> {
        let snapshot = {
            let mut session = self.session()?;
            session.reset();
            TimerSnapshot::from(session.timer())
        };

        info!("Timer reset to {}", snapshot.display);
        self.record_action("reset");
        self.publish(&snapshot, true);
        Ok(snapshot)
    }

    /// Advance the countdown by one second and dispatch cues and announcements.
    ///
    /// The session lock is released before any speech or audio is started.
    pub fn tick(&self) -> Result<Option<TickEvent>, StateError> {
        let settings = self.get_settings()?;
        let mut fired: Vec<FiredAnnouncement> = Vec::new();
        let mut cues: Vec<Cue> = Vec::new();

        let (event, snapshot) = {
            let mut session = self.session()?;
            let event = session.tick(&mut fired, &mut cues, settings.tick_enabled);
            (event, TimerSnapshot::from(session.timer()))
        };

        let Some(event) = event else {
            debug!("Tick ignored, timer not running");
            return Ok(None);
        };

        self.publish(&snapshot, false);
        if event.completed {
            info!("Countdown complete");
            self.record_action("complete");
        }

        for cue in cues {
            self.capabilities.cues.play(cue, settings.tick_volume);
        }

        let voice = settings.voice();
        for announcement in fired {
            info!("Announcement: {}", announcement.text);
            if let Err(e) = self.capabilities.speech.speak(&announcement.text, &voice) {
                error!("Failed to speak announcement {}: {}", announcement.id, e);
            }
        }

        Ok(Some(event))
    }

    pub fn add_announcement(&self, text: &str, fire_at_seconds: u64) -> Result<Announcement, StateError> {
        let announcement = {
            let mut session = self.session()?;
            let id = session.add_announcement(text, fire_at_seconds)?;
            session.announcement(&id).cloned().ok_or(StateError::NotFound(id))?
        };

        info!(
            "Announcement added at {}s: {}",
            announcement.fire_at_seconds, announcement.text
        );
        self.record_action("add-announcement");
        Ok(announcement)
    }

    /// Remove an announcement; unknown ids are not an error
    pub fn remove_announcement(&self, id: &AnnouncementId) -> Result<bool, StateError> {
        let removed = self.session()?.remove_announcement(id);
        if removed {
            info!("Announcement {} removed", id);
            self.record_action("remove-announcement");
        } else {
            debug!("Announcement {} already absent", id);
        }
        Ok(removed)
    }

    pub fn announcements(&self) -> Result<Vec<Announcement>, StateError> {
        Ok(self.session()?.announcements())
    }

    pub fn upcoming(&self, limit: usize) -> Result<Vec<Announcement>, StateError> {
        Ok(self.session()?.upcoming(limit))
    }

    /// Speak one announcement immediately without marking it fired
    pub fn speak_announcement(&self, id: &AnnouncementId) -> Result<Announcement, StateError> {
        let announcement = self
            .session()?
            .announcement(id)
            .cloned()
            .ok_or(StateError::NotFound(*id))?;
        self.speak_text(&announcement.text)?;
        Ok(announcement)
    }

    /// Speak arbitrary text with the current voice settings
    pub fn speak_text(&self, text: &str) -> Result<(), StateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StateError::InvalidInput("text must not be empty".to_string()));
        }
        let voice = self.get_settings()?.voice();
        self.capabilities.speech.speak(text, &voice)?;
        Ok(())
    }

    pub fn stop_speech(&self) -> Result<(), StateError> {
        self.capabilities.speech.stop()?;
        Ok(())
    }

    pub async fn voices(&self) -> Result<Vec<Voice>, StateError> {
        Ok(self.capabilities.speech.voices().await?)
    }

    /// Pick a default voice when none is stored yet
    pub async fn ensure_voice_selected(&self) -> Result<(), StateError> {
        if self.get_settings()?.voice_id.is_some() || !self.speech_available() {
            return Ok(());
        }

        let voices = self.voices().await?;
        if let Some(voice) = pick_default_voice(&voices) {
            info!("Selecting default voice {} ({})", voice.name, voice.id);
            self.update_settings(&SettingsPatch {
                voice_id: Some(voice.id.clone()),
                ..SettingsPatch::default()
            })?;
        }
        Ok(())
    }

    pub fn get_settings(&self) -> Result<Settings, StateError> {
        Ok(self.settings_guard()?.clone())
    }

    /// Validate, persist, then apply a settings change
    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings, StateError> {
        let mut settings = self.settings_guard()?;
        let next = settings.patched(patch)?;
        self.settings_store.save(&next)?;
        *settings = next.clone();
        drop(settings);

        info!("Settings updated");
        self.record_action("settings");
        Ok(next)
    }

    pub fn get_timer_state(&self) -> Result<TimerSnapshot, StateError> {
        Ok(TimerSnapshot::from(self.session()?.timer()))
    }

    /// Receive a snapshot after every change of the countdown
    pub fn subscribe_timer(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    /// Receive the run state whenever it flips or a new run epoch begins
    pub fn subscribe_run_state(&self) -> watch::Receiver<RunState> {
        self.run_state_tx.subscribe()
    }

    pub fn speech_available(&self) -> bool {
        self.capabilities.speech.is_available()
    }

    pub fn audio_available(&self) -> bool {
        self.capabilities.cues.is_available()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, time)) => (Some(action), Some(time)),
            None => (None, None),
        }
    }
}
