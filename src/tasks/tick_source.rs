//! One-second tick sources

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Fires once per period while the countdown is active
#[async_trait]
pub trait TickSource: Send {
    /// Resolves at the next tick. The first call resolves one full period
    /// after the source was created.
    async fn next_tick(&mut self);
}

/// Tick source backed by a tokio interval.
///
/// Ticks missed while the runtime was suspended are skipped, not replayed.
#[derive(Debug)]
pub struct IntervalTickSource {
    interval: Interval,
}

impl IntervalTickSource {
    pub fn every(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    pub fn seconds() -> Self {
        Self::every(Duration::from_secs(1))
    }
}

#[async_trait]
impl TickSource for IntervalTickSource {
    async fn next_tick(&mut self) {
        self.interval.tick().await;
    }
}
