//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::settings::SettingsStore;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "osce-timer")]
#[command(about = "Countdown timer for OSCE stations with spoken announcements")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial station length, minutes part
    #[arg(short, long, default_value = "5")]
    pub minutes: u64,

    /// Initial station length, seconds part
    #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u64).range(0..60))]
    pub seconds: u64,

    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Text-to-speech program
    #[arg(long, default_value = "espeak-ng")]
    pub speech_program: String,

    /// Audio playback program for cues
    #[arg(long, default_value = "aplay")]
    pub audio_program: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Initial countdown duration in seconds
    pub fn duration_seconds(&self) -> u64 {
        self.minutes.saturating_mul(60).saturating_add(self.seconds)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.settings.clone().unwrap_or_else(SettingsStore::default_path)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
