//! The `event` table: one giveaway round.
//!
//! At most one row has `ended_at IS NULL` (the "current" event); the schema
//! backs this with a partial unique index, and every lifecycle write
//! re-checks it inside its transaction. Rows are archived by setting
//! `ended_at`, never deleted, so the id sequence doubles as an audit trail.

use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct GiveawayEvent {
    pub id: i64,
    pub coins: i64,
    pub duration_secs: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub scheduled_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    pub surprise: bool,
}

impl GiveawayEvent {
    pub fn duration(&self) -> time::Duration {
        time::Duration::seconds(self.duration_secs)
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Waiting to be fired by the scheduler.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_at.is_some() && !self.is_started() && !self.is_ended()
    }

    /// When a running event closes. `None` until started.
    pub fn ends_at(&self) -> Option<OffsetDateTime> {
        self.started_at.map(|at| at + self.duration())
    }
}

const EVENT_COLUMNS: &str = "id, coins, duration_secs, scheduled_at, started_at, ended_at, surprise";

#[derive(Debug, Clone, Copy)]
/// Get the unique non-ended event, if any.
pub struct GetCurrentEvent;

impl Processor<GetCurrentEvent> for DatabaseProcessor {
    type Output = Option<GiveawayEvent>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetCurrentEvent")]
    async fn process(&self, _query: GetCurrentEvent) -> Result<Option<GiveawayEvent>, sqlx::Error> {
        sqlx::query_as::<_, GiveawayEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event WHERE ended_at IS NULL"
        ))
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetEventById {
    pub event_id: i64,
}

impl Processor<GetEventById> for DatabaseProcessor {
    type Output = Option<GiveawayEvent>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventById")]
    async fn process(&self, query: GetEventById) -> Result<Option<GiveawayEvent>, sqlx::Error> {
        sqlx::query_as::<_, GiveawayEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event WHERE id = $1"
        ))
        .bind(query.event_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
/// Get the most recently ended event. Operators draw winners "for the last
/// event" after it closes.
pub struct GetLastEndedEvent;

impl Processor<GetLastEndedEvent> for DatabaseProcessor {
    type Output = Option<GiveawayEvent>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetLastEndedEvent")]
    async fn process(&self, _query: GetLastEndedEvent) -> Result<Option<GiveawayEvent>, sqlx::Error> {
        sqlx::query_as::<_, GiveawayEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event WHERE ended_at IS NOT NULL ORDER BY ended_at DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await
    }
}

impl GiveawayEvent {
    /// Lock and return the current event inside a lifecycle transaction.
    pub async fn current_for_update_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Option<GiveawayEvent>, sqlx::Error> {
        sqlx::query_as::<_, GiveawayEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event WHERE ended_at IS NULL FOR UPDATE"
        ))
        .fetch_optional(&mut **tx)
        .await
    }

    /// Lock and return one event by id inside a lifecycle transaction.
    pub async fn by_id_for_update_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: i64,
    ) -> Result<Option<GiveawayEvent>, sqlx::Error> {
        sqlx::query_as::<_, GiveawayEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event WHERE id = $1 FOR UPDATE"
        ))
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn insert_scheduled_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        coins: i64,
        duration_secs: i64,
        scheduled_at: OffsetDateTime,
        surprise: bool,
    ) -> Result<GiveawayEvent, sqlx::Error> {
        sqlx::query_as::<_, GiveawayEvent>(&format!(
            "INSERT INTO event (coins, duration_secs, scheduled_at, surprise) \
             VALUES ($1, $2, $3, $4) RETURNING {EVENT_COLUMNS}"
        ))
        .bind(coins)
        .bind(duration_secs)
        .bind(scheduled_at)
        .bind(surprise)
        .fetch_one(&mut **tx)
        .await
    }

    /// Insert an immediately started event. There was never a public
    /// schedule to reveal, so the row is recorded as a surprise.
    pub async fn insert_started_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        coins: i64,
        duration_secs: i64,
        started_at: OffsetDateTime,
    ) -> Result<GiveawayEvent, sqlx::Error> {
        sqlx::query_as::<_, GiveawayEvent>(&format!(
            "INSERT INTO event (coins, duration_secs, started_at, surprise) \
             VALUES ($1, $2, $3, TRUE) RETURNING {EVENT_COLUMNS}"
        ))
        .bind(coins)
        .bind(duration_secs)
        .bind(started_at)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn mark_started_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: i64,
        started_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE event SET started_at = $1 WHERE id = $2")
            .bind(started_at)
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn mark_ended_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: i64,
        ended_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE event SET ended_at = $1 WHERE id = $2")
            .bind(ended_at)
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
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
        ended_at: Option<OffsetDateTime>,
    ) -> GiveawayEvent {
        GiveawayEvent {
            id: 1,
            coins: 100,
            duration_secs: 3600,
            scheduled_at,
            started_at,
            ended_at,
            surprise: false,
        }
    }

    #[test]
    fn phase_predicates() {
        let at = datetime!(2024-05-01 12:00 UTC);
        let scheduled = event(Some(at), None, None);
        assert!(scheduled.is_scheduled());
        assert!(!scheduled.is_started());

        let started = event(Some(at), Some(at), None);
        assert!(started.is_started());
        assert!(!started.is_scheduled());

        let ended = event(None, Some(at), Some(at + time::Duration::hours(1)));
        assert!(ended.is_ended());
        assert!(!ended.is_scheduled());
    }

    #[test]
    fn ends_at_is_start_plus_duration() {
        let at = datetime!(2024-05-01 12:00 UTC);
        let running = event(None, Some(at), None);
        assert_eq!(running.ends_at(), Some(datetime!(2024-05-01 13:00 UTC)));
        assert_eq!(event(Some(at), None, None).ends_at(), None);
    }
}
