//! Engine error types

use std::fmt;

use thiserror::Error;

/// Why a configuration request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationIssue {
    ZeroDuration,
    TimerRunning,
}

impl fmt::Display for ConfigurationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationIssue::ZeroDuration => write!(f, "duration must be greater than zero"),
            ConfigurationIssue::TimerRunning => write!(f, "cannot change duration while the timer is running"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(ConfigurationIssue),

    #[error("Invalid announcement: {0}")]
    InvalidAnnouncement(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
