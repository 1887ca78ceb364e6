//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    engine::{AnnouncementId, ConfigurationIssue, EngineError},
    settings::{Settings, SettingsError, SettingsPatch},
    services::Voice,
    state::{AppState, StateError},
    utils::format_offset,
};
use super::responses::{
    ActionResponse, AddAnnouncementRequest, AnnouncementView, ConfigureRequest, ErrorResponse,
    HealthResponse, NextAnnouncement, SpeakRequest, StatusResponse, TimerResponse, UpcomingQuery,
};

/// Number of upcoming announcements shown by default
pub const DEFAULT_UPCOMING_LIMIT: usize = 3;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a state error to a status code and JSON body
fn api_error(e: StateError) -> ApiError {
    let status = match &e {
        StateError::Engine(EngineError::InvalidConfiguration(ConfigurationIssue::TimerRunning)) => {
            StatusCode::CONFLICT
        }
        StateError::Engine(_) | StateError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        StateError::Settings(SettingsError::InvalidSettings(_)) => StatusCode::BAD_REQUEST,
        StateError::NotFound(_) => StatusCode::NOT_FOUND,
        StateError::Settings(_) | StateError::Speech(_) | StateError::LockPoisoned(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        warn!("Request rejected: {}", e);
    }
    (status, Json(ErrorResponse::new(e.to_string())))
}

fn to_seconds(minutes: u64, seconds: u64) -> Result<u64, ApiError> {
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| api_error(StateError::InvalidInput("time is too large".to_string())))
}

/// Handle POST /timer/configure - Set the countdown duration
pub async fn configure_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigureRequest>,
) -> Result<Json<TimerResponse>, ApiError> {
    let total = to_seconds(request.minutes, request.seconds)?;
    let timer = state.configure(total).map_err(api_error)?;
    Ok(Json(TimerResponse::new(
        format!("Timer set to {}", timer.display),
        timer,
    )))
}

/// Handle POST /timer/start - Start or pause the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    let timer = state.start().map_err(api_error)?;
    let message = if timer.running {
        "Timer started"
    } else if timer.completed {
        "Timer already finished"
    } else {
        "Timer paused"
    };
    Ok(Json(TimerResponse::new(message.to_string(), timer)))
}

/// Handle POST /timer/reset - Stop and restore the full duration
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, ApiError> {
    let timer = state.reset().map_err(api_error)?;
    Ok(Json(TimerResponse::new("Timer reset".to_string(), timer)))
}

/// Handle GET /announcements - List all announcements by fire time
pub async fn list_announcements_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AnnouncementView>>, ApiError> {
    let announcements = state.announcements().map_err(api_error)?;
    Ok(Json(announcements.into_iter().map(AnnouncementView::from).collect()))
}

/// Handle POST /announcements - Schedule a new announcement
pub async fn add_announcement_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddAnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementView>), ApiError> {
    let fire_at = to_seconds(request.minutes, request.seconds)?;
    let announcement = state
        .add_announcement(&request.text, fire_at)
        .map_err(api_error)?;
    info!("Announcement will be spoken at {}", format_offset(fire_at));
    Ok((StatusCode::CREATED, Json(announcement.into())))
}

/// Handle GET /announcements/upcoming - Next unfired announcements
pub async fn upcoming_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<AnnouncementView>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);
    let upcoming = state.upcoming(limit).map_err(api_error)?;
    Ok(Json(upcoming.into_iter().map(AnnouncementView::from).collect()))
}

/// Handle DELETE /announcements/:id - Remove an announcement (idempotent)
pub async fn remove_announcement_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AnnouncementId>,
) -> Result<Json<ActionResponse>, ApiError> {
    let removed = state.remove_announcement(&id).map_err(api_error)?;
    let message = if removed {
        format!("Announcement {} removed", id)
    } else {
        format!("Announcement {} not present", id)
    };
    Ok(Json(ActionResponse::ok(message)))
}

/// Handle POST /announcements/:id/speak - Speak an announcement now
pub async fn speak_announcement_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AnnouncementId>,
) -> Result<Json<AnnouncementView>, ApiError> {
    let announcement = state.speak_announcement(&id).map_err(api_error)?;
    Ok(Json(announcement.into()))
}

/// Handle POST /speak - Speak arbitrary text, e.g. to test the voice
pub async fn speak_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeakRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    state.speak_text(&request.text).map_err(api_error)?;
    let message = if state.speech_available() {
        "Speaking"
    } else {
        "Speech is not available on this host"
    };
    Ok(Json(ActionResponse::ok(message.to_string())))
}

/// Handle POST /speak/stop - Interrupt speech in progress
pub async fn stop_speech_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, ApiError> {
    state.stop_speech().map_err(api_error)?;
    Ok(Json(ActionResponse::ok("Speech stopped".to_string())))
}

/// Handle GET /voices - Voices offered by the host
pub async fn voices_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Voice>>, ApiError> {
    let voices = state.voices().await.map_err(api_error)?;
    Ok(Json(voices))
}

/// Handle GET /settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, ApiError> {
    let settings = state.get_settings().map_err(api_error)?;
    Ok(Json(settings))
}

/// Handle PUT /settings - Apply and persist a partial update
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, ApiError> {
    let settings = state.update_settings(&patch).map_err(api_error)?;
    Ok(Json(settings))
}

/// Handle GET /status - Return timer status and upcoming announcements
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let timer = state.get_timer_state().map_err(api_error)?;
    let upcoming = state.upcoming(DEFAULT_UPCOMING_LIMIT).map_err(api_error)?;
    let announcement_count = state.announcements().map_err(api_error)?.len();
    let settings = state.get_settings().map_err(api_error)?;

    let next_announcement = upcoming.first().cloned().map(|announcement| NextAnnouncement {
        seconds_until: announcement.fire_at_seconds.saturating_sub(timer.elapsed_seconds),
        announcement: announcement.into(),
    });

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        next_announcement,
        upcoming: upcoming.into_iter().map(AnnouncementView::from).collect(),
        announcement_count,
        settings,
        speech_available: state.speech_available(),
        audio_available: state.audio_available(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
