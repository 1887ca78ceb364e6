// Shared test doubles

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use osce_timer::{
    engine::{Cue, ExamSession},
    services::{CuePlayer, SpeechBackend, SpeechError, Voice},
    settings::{Settings, SettingsStore, VoiceSettings},
    state::{AppState, Capabilities},
};

/// Speech backend that records what it was asked to say
#[derive(Default)]
pub struct RecordingSpeech {
    pub spoken: Mutex<Vec<(String, VoiceSettings)>>,
}

impl RecordingSpeech {
    pub fn texts(&self) -> Vec<String> {
        self.spoken.lock().unwrap().iter().map(|(text, _)| text.clone()).collect()
    }
}

#[async_trait]
impl SpeechBackend for RecordingSpeech {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(&self, text: &str, settings: &VoiceSettings) -> Result<(), SpeechError> {
        self.spoken.lock().unwrap().push((text.to_string(), settings.clone()));
        Ok(())
    }

    fn stop(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    async fn voices(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(vec![
            Voice {
                id: "en-us".to_string(),
                name: "English (America)".to_string(),
                language: "en-us".to_string(),
            },
            Voice {
                id: "id".to_string(),
                name: "Indonesian".to_string(),
                language: "id".to_string(),
            },
        ])
    }
}

/// Cue player that records every cue and its volume
#[derive(Default)]
pub struct RecordingCues {
    pub played: Mutex<Vec<(Cue, f32)>>,
}

impl RecordingCues {
    pub fn count(&self, cue: Cue) -> usize {
        self.played.lock().unwrap().iter().filter(|(c, _)| *c == cue).count()
    }
}

impl CuePlayer for RecordingCues {
    fn is_available(&self) -> bool {
        true
    }

    fn play(&self, cue: Cue, volume: f32) {
        self.played.lock().unwrap().push((cue, volume));
    }
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub speech: Arc<RecordingSpeech>,
    pub cues: Arc<RecordingCues>,
    pub dir: tempfile::TempDir,
}

pub fn harness(total_seconds: u64) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let speech = Arc::new(RecordingSpeech::default());
    let cues = Arc::new(RecordingCues::default());

    let state = Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        ExamSession::new(total_seconds).unwrap(),
        Settings::default(),
        SettingsStore::new(dir.path().join("settings.json")),
        Capabilities {
            speech: speech.clone(),
            cues: cues.clone(),
        },
    ));

    Harness { state, speech, cues, dir }
}
