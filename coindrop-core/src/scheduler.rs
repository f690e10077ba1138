//! Single-event scheduler.
//!
//! Holds at most one pending timer, keyed to the current Scheduled event's
//! fire time. The timer is a cache of store state: every loop iteration
//! re-reads the current event, so a rearm tick, a lost race, or a process
//! restart all converge on the same answer. The sleep itself is the only
//! long-lived suspended operation in the core, and replacing it (by looping)
//! is how arming implicitly cancels a previous timer.

use crate::entities::event::GiveawayEvent;
use crate::events::RearmTickReceiver;
use crate::lifecycle::EventLifecycle;
use crate::utils::timing::fire_delay;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Backoff before re-reading store state after a read failure.
const READ_RETRY: std::time::Duration = std::time::Duration::from_secs(5);

pub struct Scheduler {
    lifecycle: EventLifecycle,
}

impl Scheduler {
    pub fn new(lifecycle: EventLifecycle) -> Self {
        Self { lifecycle }
    }

    /// Run until shutdown is signaled.
    ///
    /// Called at process start-up with a fresh view of the store, which is
    /// how a timer lost across a restart is recovered.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>, mut rearm_rx: RearmTickReceiver) {
        info!("Scheduler started");

        loop {
            let pending = match self.lifecycle.current().await {
                Ok(current) => current.filter(GiveawayEvent::is_scheduled),
                Err(e) => {
                    warn!(error = %e, "Scheduler failed to read current event, retrying");
                    tokio::select! {
                        biased;
                        _ = shutdown_rx.changed() => {
                            if *shutdown_rx.borrow() {
                                break;
                            }
                        }
                        _ = tokio::time::sleep(READ_RETRY) => {}
                    }
                    continue;
                }
            };

            match pending {
                Some(event) => {
                    let Some(scheduled_at) = event.scheduled_at else {
                        continue;
                    };
                    let delay = fire_delay(scheduled_at, OffsetDateTime::now_utc());
                    debug!(event_id = event.id, %scheduled_at, ?delay, "Timer armed");

                    tokio::select! {
                        biased;

                        _ = shutdown_rx.changed() => {
                            if *shutdown_rx.borrow() {
                                info!("Scheduler received shutdown signal");
                                break;
                            }
                        }

                        tick = rearm_rx.recv() => {
                            if tick.is_none() {
                                info!("Rearm channel closed");
                                break;
                            }
                            debug!("Rearm tick, re-deriving timer");
                        }

                        _ = tokio::time::sleep(delay) => {
                            self.fire(event.id).await;
                        }
                    }
                }
                None => {
                    tokio::select! {
                        biased;

                        _ = shutdown_rx.changed() => {
                            if *shutdown_rx.borrow() {
                                info!("Scheduler received shutdown signal");
                                break;
                            }
                        }

                        tick = rearm_rx.recv() => {
                            if tick.is_none() {
                                info!("Rearm channel closed");
                                break;
                            }
                            debug!("Rearm tick, re-deriving timer");
                        }
                    }
                }
            }
        }

        info!("Scheduler shutdown complete");
    }

    /// Fire the Scheduled -> Started transition. Losing the race to an
    /// operator who cancelled or started the event first is a no-op, not an
    /// error.
    async fn fire(&self, event_id: i64) {
        match self.lifecycle.transition_scheduled_to_started(event_id).await {
            Ok(_) => {}
            Err(e) if e.is_benign_race() => {
                debug!(event_id, reason = %e, "Scheduled start superseded, nothing to do");
            }
            Err(e) => {
                error!(event_id, error = %e, "Failed to start scheduled event");
            }
        }
    }
}
