use crate::entities::event::GiveawayEvent;

/// Which lifecycle transition produced an [`EventChanged`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventChange {
    Scheduled,
    Started,
    Stopped,
    Cancelled,
}

impl std::fmt::Display for EventChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventChange::Scheduled => write!(f, "scheduled"),
            EventChange::Started => write!(f, "started"),
            EventChange::Stopped => write!(f, "stopped"),
            EventChange::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Announcement hook payload. Carries the event row as committed.
#[derive(Debug, Clone)]
pub struct EventChanged {
    pub event: GiveawayEvent,
    pub change: EventChange,
}

/// Wakes the scheduler so it re-reads the current event and re-arms its
/// timer. Carries nothing; the store is the source of truth.
#[derive(Debug, Clone, Copy)]
pub struct RearmTick;
