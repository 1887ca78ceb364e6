//! Countdown background task

use std::sync::Arc;
use tracing::{debug, error, info};

use super::tick_source::TickSource;
use crate::state::AppState;

/// Background task that drives the countdown while it is running.
///
/// A fresh tick source is created for every run epoch, so a pause, reset or
/// restart discards the partial second in progress even when the timer is
/// running again before this task wakes up.
pub async fn countdown_task<S, F>(state: Arc<AppState>, new_tick_source: F)
where
    S: TickSource,
    F: Fn() -> S,
{
    info!("Starting countdown task");

    let mut run_state_rx = state.subscribe_run_state();

    loop {
        // Wait until the timer is started
        let epoch = match run_state_rx.wait_for(|run_state| run_state.running).await {
            Ok(run_state) => run_state.epoch,
            Err(_) => {
                debug!("Run state channel closed, stopping countdown task");
                return;
            }
        };

        debug!("Countdown running (epoch {})", epoch);
        let mut ticks = new_tick_source();

        loop {
            tokio::select! {
                _ = ticks.next_tick() => {
                    match state.tick() {
                        Ok(Some(event)) if !event.running => {
                            debug!("Countdown stopped at {}s remaining", event.remaining_seconds);
                            break;
                        }
                        Ok(Some(_)) => {}
                        Ok(None) => break,
                        Err(e) => {
                            error!("Failed to advance countdown: {}", e);
                            break;
                        }
                    }
                }

                changed = run_state_rx.changed() => {
                    if changed.is_err() {
                        debug!("Run state channel closed, stopping countdown task");
                        return;
                    }
                    let run_state = *run_state_rx.borrow_and_update();
                    if !run_state.running || run_state.epoch != epoch {
                        debug!("Countdown paused, reset or restarted");
                        break;
                    }
                }
            }
        }
    }
}
