//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::Announcement,
    settings::Settings,
    state::TimerSnapshot,
    utils::format_offset,
};

/// Body of POST /timer/configure
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureRequest {
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
}

/// Body of POST /announcements, fire time given as minutes and seconds elapsed
#[derive(Debug, Clone, Deserialize)]
pub struct AddAnnouncementRequest {
    pub text: String,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
}

/// Body of POST /speak
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

/// Query of GET /announcements/upcoming
#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<usize>,
}

/// Response structure for timer control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl TimerResponse {
    pub fn new(message: String, timer: TimerSnapshot) -> Self {
        let status = if timer.completed {
            "completed"
        } else if timer.running {
            "running"
        } else {
            "stopped"
        };
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// An announcement as shown to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementView {
    #[serde(flatten)]
    pub announcement: Announcement,
    /// Fire time as `M:SS` elapsed
    pub at: String,
}

impl From<Announcement> for AnnouncementView {
    fn from(announcement: Announcement) -> Self {
        Self {
            at: format_offset(announcement.fire_at_seconds),
            announcement,
        }
    }
}

/// The next announcement and how long until it fires
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextAnnouncement {
    #[serde(flatten)]
    pub announcement: AnnouncementView,
    pub seconds_until: u64,
}

/// Generic message response for actions without a richer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ActionResponse {
    pub fn ok(message: String) -> Self {
        Self {
            status: "ok".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self {
            status: "error".to_string(),
            error,
            timestamp: Utc::now(),
        }
    }
}

/// Status response with timer and announcement overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub next_announcement: Option<NextAnnouncement>,
    pub upcoming: Vec<AnnouncementView>,
    pub announcement_count: usize,
    pub settings: Settings,
    pub speech_available: bool,
    pub audio_available: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
