//! Change notifications emitted by the lifecycle.
//!
//! Two channels leave the core after every committed mutation:
//!
//! - `EventChanged` -> the announcement consumer (fire-and-forget; a slow or
//!   dead consumer never rolls back a transition)
//! - `RearmTick` -> the scheduler, which re-derives its single timer from
//!   store state
//!
//! Messages are ephemeral; consumers that need current state re-fetch it.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, EventChangedReceiver, EventChangedSender, RearmTickReceiver,
    RearmTickSender, event_changed_channel, rearm_tick_channel,
};
pub use types::{EventChange, EventChanged, RearmTick};
