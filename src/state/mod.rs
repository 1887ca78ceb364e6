//! State management module
//!
//! This module contains the shared application state and the views it publishes.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, Capabilities, RunState, StateError};
pub use timer_state::TimerSnapshot;
