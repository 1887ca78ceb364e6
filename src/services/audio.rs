//! Audio cue playback through `aplay`

use std::process::Stdio;

use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, info, warn};

use super::synth;
use crate::engine::Cue;

/// Audio-cue capability. Playback failures are logged, never returned.
pub trait CuePlayer: Send + Sync {
    fn is_available(&self) -> bool;

    fn play(&self, cue: Cue, volume: f32);
}

/// Used when no playback program is installed
#[derive(Debug, Default)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn is_available(&self) -> bool {
        false
    }

    fn play(&self, cue: Cue, _volume: f32) {
        debug!("Audio unavailable, skipping {:?} cue", cue);
    }
}

/// Pipes synthesized WAV data into `aplay -q -`
#[derive(Debug, Clone)]
pub struct AplayCuePlayer {
    program: String,
}

impl AplayCuePlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    /// Probe for the program, returning a player only if it runs
    pub async fn detect(program: &str) -> Option<Self> {
        match Command::new(program).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                info!("{} is available", program);
                Some(Self::new(program))
            }
            Ok(_) | Err(_) => {
                warn!("{} is not available, audio cues disabled", program);
                None
            }
        }
    }
}

impl CuePlayer for AplayCuePlayer {
    fn is_available(&self) -> bool {
        true
    }

    fn play(&self, cue: Cue, volume: f32) {
        let wav = match synth::encode_wav(&synth::render(cue, volume)) {
            Ok(wav) => wav,
            Err(e) => {
                warn!("Error rendering {:?} cue: {}", cue, e);
                return;
            }
        };

        let spawned = Command::new(&self.program)
            .args(["-q", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("Error playing {:?} cue: {}", cue, e);
                return;
            }
        };

        let Some(mut stdin) = child.stdin.take() else {
            warn!("No stdin for {}", self.program);
            return;
        };

        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&wav).await {
                warn!("Error writing {:?} cue: {}", cue, e);
            }
            drop(stdin);
            if let Err(e) = child.wait().await {
                warn!("Error waiting for cue playback: {}", e);
            }
        });
    }
}
