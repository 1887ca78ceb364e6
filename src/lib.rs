//! OSCE Timer - countdown timer for structured oral examinations
//!
//! This library provides the countdown engine with time-keyed spoken
//! announcements, the audio cues played while it runs, and the HTTP API and
//! background task that drive it.

pub mod config;
pub mod engine;
pub mod settings;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::ExamSession;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
