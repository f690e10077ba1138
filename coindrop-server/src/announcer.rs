//! Announcement consumer.
//!
//! Receives `EventChanged` notifications from the lifecycle and turns them
//! into announcement lines. This is the seam where the embedding chat bot
//! subscribes; standalone, the server logs the line and moves on. Delivery
//! is fire-and-forget: nothing here can undo a committed transition.

use coindrop_core::events::{EventChange, EventChanged, EventChangedReceiver};
use tokio::sync::watch;
use tracing::{debug, info};

pub struct Announcer {
    change_rx: EventChangedReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl Announcer {
    pub fn new(change_rx: EventChangedReceiver, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            change_rx,
            shutdown_rx,
        }
    }

    /// Run the Announcer until shutdown is signaled.
    pub async fn run(mut self) {
        info!("Announcer started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("Announcer received shutdown signal");
                        break;
                    }
                }

                Some(changed) = self.change_rx.recv() => {
                    match announcement_line(&changed) {
                        Some(line) => {
                            info!(
                                event_id = changed.event.id,
                                change = %changed.change,
                                announcement = %line,
                                "Event announcement"
                            );
                        }
                        None => {
                            debug!(
                                event_id = changed.event.id,
                                "Surprise event scheduled, staying quiet"
                            );
                        }
                    }
                }

                else => {
                    info!("EventChanged channel closed");
                    break;
                }
            }
        }

        info!("Announcer shutdown complete");
    }
}

/// The public announcement for a transition, or `None` when the change must
/// stay hidden (a surprise event being scheduled).
fn announcement_line(changed: &EventChanged) -> Option<String> {
    let event = &changed.event;
    match changed.change {
        EventChange::Scheduled => {
            if event.surprise {
                return None;
            }
            let starts_at = event.scheduled_at?;
            Some(format!(
                "A new giveaway of {} coins has been scheduled for {starts_at}!",
                event.coins
            ))
        }
        EventChange::Started => Some(format!(
            "The giveaway is live! {} coins are being distributed among eligible members.",
            event.coins
        )),
        EventChange::Stopped => Some("The giveaway has ended. Winners will be drawn soon!".to_string()),
        EventChange::Cancelled => Some("The scheduled giveaway has been called off.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coindrop_core::entities::event::GiveawayEvent;
    use time::macros::datetime;

    fn changed(change: EventChange, surprise: bool) -> EventChanged {
        EventChanged {
            event: GiveawayEvent {
                id: 3,
                coins: 250,
                duration_secs: 3600,
                scheduled_at: Some(datetime!(2024-05-01 12:00 UTC)),
                started_at: None,
                ended_at: None,
                surprise,
            },
            change,
        }
    }

    #[test]
    fn surprise_schedule_is_silent() {
        assert!(announcement_line(&changed(EventChange::Scheduled, true)).is_none());
    }

    #[test]
    fn public_schedule_names_the_pool() {
        let line = announcement_line(&changed(EventChange::Scheduled, false)).unwrap();
        assert!(line.contains("250"));
    }

    #[test]
    fn start_is_announced_even_for_surprise_events() {
        assert!(announcement_line(&changed(EventChange::Started, true)).is_some());
    }
}
