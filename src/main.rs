//! OSCE Timer - countdown timer for structured oral examinations
//!
//! This is the main entry point for the osce-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use osce_timer::{
    api::create_router,
    config::Config,
    engine::ExamSession,
    services::{detect_cue_player, detect_speech},
    settings::SettingsStore,
    state::{AppState, Capabilities},
    tasks::{countdown_task, IntervalTickSource},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("osce_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting osce-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, duration={}s",
          config.host, config.port, config.duration_seconds());

    let session = ExamSession::new(config.duration_seconds())?;

    let store = SettingsStore::new(config.settings_path());
    let settings = store.load_or_default();
    info!("Settings file: {}", store.path().display());

    // Missing programs degrade to silent backends
    let capabilities = Capabilities {
        speech: detect_speech(&config.speech_program).await,
        cues: detect_cue_player(&config.audio_program).await,
    };

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        session,
        settings,
        store,
        capabilities,
    ));

    if let Err(e) = state.ensure_voice_selected().await {
        warn!("Could not select a default voice: {}", e);
    }

    // Start the countdown background task
    let countdown_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_task(countdown_state, IntervalTickSource::seconds).await;
    });

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timer/configure          - Set duration {{minutes, seconds}}");
    info!("  POST   /timer/start              - Start or pause");
    info!("  POST   /timer/reset              - Reset to full duration");
    info!("  GET    /announcements            - List announcements");
    info!("  POST   /announcements            - Add {{text, minutes, seconds}}");
    info!("  GET    /announcements/upcoming   - Next announcements");
    info!("  DELETE /announcements/:id        - Remove announcement");
    info!("  POST   /announcements/:id/speak  - Speak announcement now");
    info!("  POST   /speak, /speak/stop       - Test or stop speech");
    info!("  GET    /voices                   - Available voices");
    info!("  GET|PUT /settings                - Voice and cue settings");
    info!("  GET    /status                   - Timer status");
    info!("  GET    /health                   - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
