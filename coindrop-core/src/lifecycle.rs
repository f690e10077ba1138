//! The event state machine: `None -> Scheduled -> Started -> Ended`, with a
//! direct `None/Scheduled -> Ended` edge for cancellation.
//!
//! Every mutation is one store transaction: the precondition check (is there
//! a current event? has it started?) and the write commit together, so when
//! an operator and the scheduler race, whichever commits first wins and the
//! loser observes a clean `StateConflict`. The single-current-event invariant
//! is enforced here and backed by the schema's partial unique index.

use crate::allocation::allocate_participants_tx;
use crate::entities::event::{GetCurrentEvent, GetLastEndedEvent, GiveawayEvent};
use crate::error::{CoreError, conflict_on_unique};
use crate::events::{EventChange, EventChanged, EventChangedSender, RearmTick, RearmTickSender};
use crate::framework::DatabaseProcessor;
use crate::randomness::SharedRng;
use kanau::processor::Processor;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Message used when an insert trips the single-current-event index.
const CONFLICT_CURRENT_EXISTS: &str = "already have an event";

#[derive(Clone)]
pub struct EventLifecycle {
    pool: PgPool,
    rng: SharedRng,
    change_tx: EventChangedSender,
    rearm_tx: RearmTickSender,
}

impl EventLifecycle {
    pub fn new(
        pool: PgPool,
        rng: SharedRng,
        change_tx: EventChangedSender,
        rearm_tx: RearmTickSender,
    ) -> Self {
        Self {
            pool,
            rng,
            change_tx,
            rearm_tx,
        }
    }

    fn processor(&self) -> DatabaseProcessor {
        DatabaseProcessor {
            pool: self.pool.clone(),
        }
    }

    /// The unique non-ended event, if any.
    pub async fn current(&self) -> Result<Option<GiveawayEvent>, CoreError> {
        Ok(self.processor().process(GetCurrentEvent).await?)
    }

    /// The most recently ended event, if any.
    pub async fn last_ended(&self) -> Result<Option<GiveawayEvent>, CoreError> {
        Ok(self.processor().process(GetLastEndedEvent).await?)
    }

    /// Create a Scheduled event to be started by the scheduler at
    /// `scheduled_at`.
    pub async fn schedule(
        &self,
        coins: i64,
        scheduled_at: OffsetDateTime,
        duration: time::Duration,
        surprise: bool,
    ) -> Result<GiveawayEvent, CoreError> {
        validate_pool_and_duration(coins, duration)?;
        let now = OffsetDateTime::now_utc();
        if scheduled_at <= now {
            return Err(CoreError::InvalidArgument(format!(
                "scheduled time {scheduled_at} is in the past"
            )));
        }

        let mut tx = self.pool.begin().await?;
        let current = GiveawayEvent::current_for_update_tx(&mut tx).await?;
        ensure_no_current(current.as_ref())?;
        let event = GiveawayEvent::insert_scheduled_tx(
            &mut tx,
            coins,
            duration.whole_seconds(),
            scheduled_at,
            surprise,
        )
        .await
        .map_err(|e| conflict_on_unique(e, CONFLICT_CURRENT_EXISTS))?;
        tx.commit().await?;

        info!(
            event_id = event.id,
            coins,
            scheduled_at = %scheduled_at,
            surprise,
            "Event scheduled"
        );
        self.notify(event.clone(), EventChange::Scheduled).await;
        Ok(event)
    }

    /// Start an event immediately, enrolling the currently eligible users.
    pub async fn start(
        &self,
        coins: i64,
        duration: time::Duration,
    ) -> Result<GiveawayEvent, CoreError> {
        validate_pool_and_duration(coins, duration)?;
        let now = OffsetDateTime::now_utc();

        let mut tx = self.pool.begin().await?;
        let current = GiveawayEvent::current_for_update_tx(&mut tx).await?;
        ensure_no_current(current.as_ref())?;
        let event =
            GiveawayEvent::insert_started_tx(&mut tx, coins, duration.whole_seconds(), now)
                .await
                .map_err(|e| conflict_on_unique(e, CONFLICT_CURRENT_EXISTS))?;
        let enrolled = allocate_participants_tx(&mut tx, &self.rng, &event).await?;
        tx.commit().await?;

        info!(event_id = event.id, coins, enrolled, "Event started");
        self.notify(event.clone(), EventChange::Started).await;
        Ok(event)
    }

    /// Scheduler-only path: fire a Scheduled event whose time has come.
    ///
    /// When the event was concurrently cancelled or started between arming
    /// and firing, this returns `NotFound`/`StateConflict`; the scheduler
    /// treats those as benign race outcomes.
    pub async fn transition_scheduled_to_started(
        &self,
        event_id: i64,
    ) -> Result<GiveawayEvent, CoreError> {
        let now = OffsetDateTime::now_utc();

        let mut tx = self.pool.begin().await?;
        let Some(event) = GiveawayEvent::by_id_for_update_tx(&mut tx, event_id).await? else {
            return Err(CoreError::NotFound("event"));
        };
        ensure_startable(&event)?;
        GiveawayEvent::mark_started_tx(&mut tx, event_id, now).await?;
        let event = GiveawayEvent {
            started_at: Some(now),
            ..event
        };
        let enrolled = allocate_participants_tx(&mut tx, &self.rng, &event).await?;
        tx.commit().await?;

        info!(event_id, enrolled, "Scheduled event started");
        self.notify(event.clone(), EventChange::Started).await;
        Ok(event)
    }

    /// End the running event.
    pub async fn stop(&self) -> Result<GiveawayEvent, CoreError> {
        let now = OffsetDateTime::now_utc();

        let mut tx = self.pool.begin().await?;
        let Some(event) = GiveawayEvent::current_for_update_tx(&mut tx).await? else {
            return Err(CoreError::NotFound("current event"));
        };
        ensure_stoppable(&event)?;
        GiveawayEvent::mark_ended_tx(&mut tx, event.id, now).await?;
        tx.commit().await?;

        let event = GiveawayEvent {
            ended_at: Some(now),
            ..event
        };
        info!(event_id = event.id, "Event stopped");
        self.notify(event.clone(), EventChange::Stopped).await;
        Ok(event)
    }

    /// Archive a Scheduled event before it starts.
    pub async fn cancel(&self) -> Result<GiveawayEvent, CoreError> {
        let now = OffsetDateTime::now_utc();

        let mut tx = self.pool.begin().await?;
        let Some(event) = GiveawayEvent::current_for_update_tx(&mut tx).await? else {
            return Err(CoreError::NotFound("current event"));
        };
        ensure_cancellable(&event)?;
        GiveawayEvent::mark_ended_tx(&mut tx, event.id, now).await?;
        tx.commit().await?;

        let event = GiveawayEvent {
            ended_at: Some(now),
            ..event
        };
        info!(event_id = event.id, "Event cancelled");
        self.notify(event.clone(), EventChange::Cancelled).await;
        Ok(event)
    }

    /// Notify the announcement consumer and the scheduler after a committed
    /// transition. Failures here never undo the transition.
    async fn notify(&self, event: GiveawayEvent, change: EventChange) {
        let event_id = event.id;
        if self
            .change_tx
            .send(EventChanged { event, change })
            .await
            .is_err()
        {
            warn!(event_id, "Announcement channel closed, dropping notification");
        }
        if self.rearm_tx.send(RearmTick).await.is_err() {
            warn!(event_id, "Scheduler rearm channel closed");
        }
    }
}

fn validate_pool_and_duration(coins: i64, duration: time::Duration) -> Result<(), CoreError> {
    if coins < 0 {
        return Err(CoreError::InvalidArgument(format!(
            "coin pool must be non-negative, got {coins}"
        )));
    }
    if duration <= time::Duration::ZERO {
        return Err(CoreError::InvalidArgument(
            "duration must be positive".to_string(),
        ));
    }
    Ok(())
}

fn ensure_no_current(current: Option<&GiveawayEvent>) -> Result<(), CoreError> {
    match current {
        Some(event) if event.is_started() => Err(CoreError::StateConflict(
            "already have an active event".to_string(),
        )),
        Some(_) => Err(CoreError::StateConflict(
            "already have an event in schedule".to_string(),
        )),
        None => Ok(()),
    }
}

fn ensure_startable(event: &GiveawayEvent) -> Result<(), CoreError> {
    if event.is_ended() {
        return Err(CoreError::StateConflict(
            "the event has already ended".to_string(),
        ));
    }
    if event.is_started() {
        return Err(CoreError::StateConflict(
            "the event has already started".to_string(),
        ));
    }
    Ok(())
}

fn ensure_stoppable(event: &GiveawayEvent) -> Result<(), CoreError> {
    if event.is_started() {
        Ok(())
    } else {
        Err(CoreError::StateConflict(
            "the event has not started yet, use cancel instead".to_string(),
        ))
    }
}

fn ensure_cancellable(event: &GiveawayEvent) -> Result<(), CoreError> {
    if event.is_started() {
        Err(CoreError::StateConflict(
            "the event has already started, use stop instead".to_string(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn event(
        scheduled_at: Option<OffsetDateTime>,
        started_at: Option<OffsetDateTime>,
    ) -> GiveawayEvent {
        GiveawayEvent {
            id: 1,
            coins: 100,
            duration_secs: 3600,
            scheduled_at,
            started_at,
            ended_at: None,
            surprise: false,
        }
    }

    const AT: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);

    #[test]
    fn negative_pool_is_rejected() {
        let err = validate_pool_and_duration(-1, time::Duration::hours(1));
        assert!(matches!(err, Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn zero_pool_is_allowed() {
        assert!(validate_pool_and_duration(0, time::Duration::hours(1)).is_ok());
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        for d in [time::Duration::ZERO, time::Duration::seconds(-5)] {
            let err = validate_pool_and_duration(10, d);
            assert!(matches!(err, Err(CoreError::InvalidArgument(_))));
        }
    }

    #[test]
    fn scheduling_conflicts_with_any_current_event() {
        let scheduled = event(Some(AT), None);
        let started = event(None, Some(AT));
        assert!(matches!(
            ensure_no_current(Some(&scheduled)),
            Err(CoreError::StateConflict(_))
        ));
        assert!(matches!(
            ensure_no_current(Some(&started)),
            Err(CoreError::StateConflict(_))
        ));
        assert!(ensure_no_current(None).is_ok());
    }

    #[test]
    fn stop_requires_a_started_event() {
        let scheduled = event(Some(AT), None);
        assert!(matches!(
            ensure_stoppable(&scheduled),
            Err(CoreError::StateConflict(msg)) if msg.contains("use cancel instead")
        ));
        assert!(ensure_stoppable(&event(None, Some(AT))).is_ok());
    }

    #[test]
    fn cancel_requires_a_not_started_event() {
        let started = event(None, Some(AT));
        assert!(matches!(
            ensure_cancellable(&started),
            Err(CoreError::StateConflict(msg)) if msg.contains("use stop instead")
        ));
        assert!(ensure_cancellable(&event(Some(AT), None)).is_ok());
    }

    #[test]
    fn fired_event_must_still_be_scheduled() {
        assert!(ensure_startable(&event(Some(AT), None)).is_ok());
        assert!(matches!(
            ensure_startable(&event(Some(AT), Some(AT))),
            Err(CoreError::StateConflict(_))
        ));
        let ended = GiveawayEvent {
            ended_at: Some(AT),
            ..event(Some(AT), None)
        };
        assert!(matches!(
            ensure_startable(&ended),
            Err(CoreError::StateConflict(_))
        ));
    }
}
