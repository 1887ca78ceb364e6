//! Persisted user settings
//!
//! Voice and cue preferences are stored as a single JSON document. The file is
//! read once at startup and rewritten in full on every change.

use std::{
    fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const RATE_RANGE: RangeInclusive<f32> = 0.5..=2.0;
pub const PITCH_RANGE: RangeInclusive<f32> = 0.5..=2.0;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Voice parameters handed to the speech backend on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub voice_id: Option<String>,
    pub volume: f32,
    pub rate: f32,
    pub pitch: f32,
}

/// Everything the user can tune
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tick_enabled: bool,
    pub tick_volume: f32,
    pub voice_id: Option<String>,
    pub volume: f32,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_enabled: true,
            tick_volume: 0.3,
            voice_id: None,
            volume: 0.8,
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl Settings {
    pub fn voice(&self) -> VoiceSettings {
        VoiceSettings {
            voice_id: self.voice_id.clone(),
            volume: self.volume,
            rate: self.rate,
            pitch: self.pitch,
        }
    }

    /// Check every numeric field against its allowed range
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range("tick_volume", self.tick_volume, &VOLUME_RANGE)?;
        check_range("volume", self.volume, &VOLUME_RANGE)?;
        check_range("rate", self.rate, &RATE_RANGE)?;
        check_range("pitch", self.pitch, &PITCH_RANGE)?;
        Ok(())
    }

    /// Apply a partial update, returning the validated result without
    /// modifying `self`
    pub fn patched(&self, patch: &SettingsPatch) -> Result<Settings, SettingsError> {
        let mut next = self.clone();
        if let Some(tick_enabled) = patch.tick_enabled {
            next.tick_enabled = tick_enabled;
        }
        if let Some(tick_volume) = patch.tick_volume {
            next.tick_volume = tick_volume;
        }
        if let Some(voice_id) = &patch.voice_id {
            next.voice_id = Some(voice_id.clone()).filter(|v| !v.is_empty());
        }
        if let Some(volume) = patch.volume {
            next.volume = volume;
        }
        if let Some(rate) = patch.rate {
            next.rate = rate;
        }
        if let Some(pitch) = patch.pitch {
            next.pitch = pitch;
        }
        next.validate()?;
        Ok(next)
    }
}

/// Partial settings update; absent fields are left alone.
/// An empty `voice_id` clears the voice selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub tick_enabled: Option<bool>,
    pub tick_volume: Option<f32>,
    pub voice_id: Option<String>,
    pub volume: Option<f32>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
}

fn check_range(field: &str, value: f32, range: &RangeInclusive<f32>) -> Result<(), SettingsError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::InvalidSettings(format!(
            "{} must be between {} and {}, got {}",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}

/// JSON file backing the settings
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform config location, falling back to the working directory
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "osce-timer")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("osce-timer-settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored settings. A missing file yields the defaults.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            info!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let raw = fs::read_to_string(&self.path)?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        debug!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }

    /// Like [`load`](Self::load), but an unreadable or out-of-range file
    /// falls back to the defaults so the service can still start
    pub fn load_or_default(&self) -> Settings {
        self.load().unwrap_or_else(|e| {
            warn!("Ignoring settings file {}: {}", self.path.display(), e);
            Settings::default()
        })
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, raw)?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
