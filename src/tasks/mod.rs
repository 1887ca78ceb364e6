//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod countdown;
pub mod tick_source;

// Re-export main functions
pub use countdown::countdown_task;
pub use tick_source::{IntervalTickSource, TickSource};
