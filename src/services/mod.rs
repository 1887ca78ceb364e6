//! Host capabilities module
//!
//! Speech and audio cue playback reached through command line tools, with
//! silent fallbacks when the host does not provide them.

pub mod audio;
pub mod speech;
pub mod synth;

use std::sync::Arc;

// Re-export main types
pub use audio::{AplayCuePlayer, CuePlayer, SilentCuePlayer};
pub use speech::{EspeakBackend, SilentSpeech, SpeechBackend, SpeechError, Voice};

/// Detect the speech program, degrading to silence when it is missing
pub async fn detect_speech(program: &str) -> Arc<dyn SpeechBackend> {
    match EspeakBackend::detect(program).await {
        Some(backend) => Arc::new(backend),
        None => Arc::new(SilentSpeech),
    }
}

/// Detect the playback program, degrading to silence when it is missing
pub async fn detect_cue_player(program: &str) -> Arc<dyn CuePlayer> {
    match AplayCuePlayer::detect(program).await {
        Some(player) => Arc::new(player),
        None => Arc::new(SilentCuePlayer),
    }
}
