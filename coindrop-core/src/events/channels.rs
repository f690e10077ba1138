use super::types::{EventChanged, RearmTick};
use tokio::sync::mpsc;

/// Default buffer size for notification channels. Enough to absorb bursts
/// while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

pub type EventChangedSender = mpsc::Sender<EventChanged>;
pub type EventChangedReceiver = mpsc::Receiver<EventChanged>;

pub type RearmTickSender = mpsc::Sender<RearmTick>;
pub type RearmTickReceiver = mpsc::Receiver<RearmTick>;

/// Create the announcement channel.
pub fn event_changed_channel() -> (EventChangedSender, EventChangedReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create the scheduler rearm channel.
pub fn rearm_tick_channel() -> (RearmTickSender, RearmTickReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
