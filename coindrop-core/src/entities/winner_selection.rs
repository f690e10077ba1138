//! The `winner_selection` table: the recorded outcome of a draw.
//!
//! One row per event at most. The insert uses `ON CONFLICT DO NOTHING` so
//! that two concurrent draws converge on whichever committed first.

use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WinnerSelection {
    pub event_id: i64,
    pub winner_user_ids: Vec<i64>,
    pub drawn_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct GetWinnerSelection {
    pub event_id: i64,
}

impl Processor<GetWinnerSelection> for DatabaseProcessor {
    type Output = Option<WinnerSelection>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetWinnerSelection")]
    async fn process(
        &self,
        query: GetWinnerSelection,
    ) -> Result<Option<WinnerSelection>, sqlx::Error> {
        sqlx::query_as::<_, WinnerSelection>(
            "SELECT event_id, winner_user_ids, drawn_at FROM winner_selection WHERE event_id = $1",
        )
        .bind(query.event_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Persist a fresh draw. Returns `false` when a selection already exists,
/// in which case the stored one wins.
pub struct InsertWinnerSelection {
    pub event_id: i64,
    pub winner_user_ids: Vec<i64>,
}

impl Processor<InsertWinnerSelection> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertWinnerSelection")]
    async fn process(&self, insert: InsertWinnerSelection) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO winner_selection (event_id, winner_user_ids) VALUES ($1, $2) \
             ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(insert.event_id)
        .bind(&insert.winner_user_ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[derive(Debug, Clone, Copy)]
/// Delete the selection for an event, permitting one new draw. Returns the
/// number of rows removed (0 when there was nothing to reset).
pub struct DeleteWinnerSelection {
    pub event_id: i64,
}

impl Processor<DeleteWinnerSelection> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteWinnerSelection")]
    async fn process(&self, delete: DeleteWinnerSelection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM winner_selection WHERE event_id = $1")
            .bind(delete.event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
