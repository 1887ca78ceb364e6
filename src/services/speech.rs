//! Text-to-speech through the `espeak-ng` command line tool

use std::{process::Stdio, sync::Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::settings::VoiceSettings;

/// espeak-ng words per minute at rate 1.0
const BASE_WORDS_PER_MINUTE: f32 = 175.0;
/// espeak-ng pitch at pitch 1.0
const BASE_PITCH: f32 = 50.0;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} exited with an error: {1}")]
    Failed(String, String),

    #[error("Speech state lock poisoned")]
    LockPoisoned,
}

/// A voice offered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
}

/// Speech capability. A new `speak` interrupts the utterance in progress.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    fn is_available(&self) -> bool;

    fn speak(&self, text: &str, settings: &VoiceSettings) -> Result<(), SpeechError>;

    fn stop(&self) -> Result<(), SpeechError>;

    async fn voices(&self) -> Result<Vec<Voice>, SpeechError>;
}

/// Used when no speech program is installed
#[derive(Debug, Default)]
pub struct SilentSpeech;

#[async_trait]
impl SpeechBackend for SilentSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&self, text: &str, _settings: &VoiceSettings) -> Result<(), SpeechError> {
        debug!("Speech unavailable, not speaking: {}", text);
        Ok(())
    }

    fn stop(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    async fn voices(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(Vec::new())
    }
}

/// espeak-ng driven backend
#[derive(Debug)]
pub struct EspeakBackend {
    program: String,
    current: Mutex<Option<Child>>,
}

impl EspeakBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: Mutex::new(None),
        }
    }

    /// Probe for the program, returning a backend only if it runs
    pub async fn detect(program: &str) -> Option<Self> {
        match Command::new(program).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                info!("{} is available", program);
                Some(Self::new(program))
            }
            Ok(_) | Err(_) => {
                warn!("{} is not available, speech disabled", program);
                None
            }
        }
    }

    fn interrupt(&self, current: &mut Option<Child>) {
        if let Some(mut child) = current.take() {
            if let Err(e) = child.start_kill() {
                debug!("Previous utterance already finished: {}", e);
            }
        }
    }
}

#[async_trait]
impl SpeechBackend for EspeakBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(&self, text: &str, settings: &VoiceSettings) -> Result<(), SpeechError> {
        let mut current = self.current.lock().map_err(|_| SpeechError::LockPoisoned)?;
        self.interrupt(&mut current);

        let child = Command::new(&self.program)
            .args(espeak_args(text, settings))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        debug!("Speaking: {}", text);
        *current = Some(child);
        Ok(())
    }

    fn stop(&self) -> Result<(), SpeechError> {
        let mut current = self.current.lock().map_err(|_| SpeechError::LockPoisoned)?;
        self.interrupt(&mut current);
        Ok(())
    }

    async fn voices(&self) -> Result<Vec<Voice>, SpeechError> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .output()
            .await
            .map_err(|e| SpeechError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Failed(self.program.clone(), stderr.into_owned()));
        }

        Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Command line for one utterance
pub fn espeak_args(text: &str, settings: &VoiceSettings) -> Vec<String> {
    let mut args = Vec::with_capacity(9);
    if let Some(voice) = &settings.voice_id {
        args.push("-v".to_string());
        args.push(voice.clone());
    }

    let amplitude = (settings.volume.clamp(0.0, 1.0) * 200.0).round() as u32;
    let words_per_minute = (settings.rate * BASE_WORDS_PER_MINUTE).round() as u32;
    let pitch = (settings.pitch * BASE_PITCH).round().clamp(0.0, 99.0) as u32;

    args.push("-a".to_string());
    args.push(amplitude.to_string());
    args.push("-s".to_string());
    args.push(words_per_minute.to_string());
    args.push("-p".to_string());
    args.push(pitch.to_string());

    // Leading dashes would be read as options
    let text = text.trim();
    if text.starts_with('-') {
        args.push(format!(" {}", text));
    } else {
        args.push(text.to_string());
    }
    args
}

/// Parse `espeak-ng --voices` output.
///
/// Columns: `Pty Language Age/Gender VoiceName File Other Languages`
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 5 {
                return None;
            }
            Some(Voice {
                id: columns[1].to_string(),
                name: columns[3].replace('_', " "),
                language: columns[1].to_string(),
            })
        })
        .collect()
}

/// Preferred voice when none is configured: Indonesian, then English, then
/// whatever comes first
pub fn pick_default_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|voice| voice.language.to_lowercase().starts_with("id"))
        .or_else(|| voices.iter().find(|voice| voice.language.to_lowercase().starts_with("en")))
        .or_else(|| voices.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOICES: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 5  en-gb           --/M      English_(Great_Britain) gmw/en
 5  en-us           --/M      English_(America)  gmw/en-US
 5  id              --/M      Indonesian         poz/id
";

    #[test]
    fn parses_voice_table() {
        let voices = parse_voice_list(VOICES);
        assert_eq!(voices.len(), 4);
        assert_eq!(voices[1].id, "en-gb");
        assert_eq!(voices[1].name, "English (Great Britain)");
        assert_eq!(voices[3].language, "id");
    }

    #[test]
    fn default_voice_prefers_indonesian_then_english() {
        let voices = parse_voice_list(VOICES);
        assert_eq!(pick_default_voice(&voices).unwrap().id, "id");

        let without_id: Vec<Voice> = voices.iter().filter(|v| v.id != "id").cloned().collect();
        assert_eq!(pick_default_voice(&without_id).unwrap().id, "en-gb");

        let only_af = vec![voices[0].clone()];
        assert_eq!(pick_default_voice(&only_af).unwrap().id, "af");
        assert!(pick_default_voice(&[]).is_none());
    }

    #[test]
    fn maps_voice_settings_to_arguments() {
        let settings = VoiceSettings {
            voice_id: Some("id".to_string()),
            volume: 0.8,
            rate: 2.0,
            pitch: 2.0,
        };
        let args = espeak_args("Waktu habis", &settings);
        assert_eq!(args, vec!["-v", "id", "-a", "160", "-s", "350", "-p", "99", "Waktu habis"]);
    }

    #[test]
    fn guards_leading_dash() {
        let settings = VoiceSettings {
            voice_id: None,
            volume: 1.0,
            rate: 1.0,
            pitch: 1.0,
        };
        let args = espeak_args("-5 minutes", &settings);
        assert_eq!(args.last().unwrap(), " -5 minutes");
        assert_eq!(args[0], "-a");
    }

    #[tokio::test]
    async fn silent_backend_is_noop() {
        let speech = SilentSpeech;
        assert!(!speech.is_available());
        assert!(speech.speak("hello", &crate::settings::Settings::default().voice()).is_ok());
        assert!(speech.voices().await.unwrap().is_empty());
    }
}
