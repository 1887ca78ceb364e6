//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/configure", post(configure_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/reset", post(reset_handler))
        .route(
            "/announcements",
            get(list_announcements_handler).post(add_announcement_handler),
        )
        .route("/announcements/upcoming", get(upcoming_handler))
        .route("/announcements/:id", delete(remove_announcement_handler))
        .route("/announcements/:id/speak", post(speak_announcement_handler))
        .route("/speak", post(speak_handler))
        .route("/speak/stop", post(stop_speech_handler))
        .route("/voices", get(voices_handler))
        .route("/settings", get(get_settings_handler).put(update_settings_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
