//! The `participant` table: a user's materialized stake in one event.
//!
//! Rows are created exactly once, inside the transaction that starts the
//! event, and never mutated afterwards.

use crate::allocation::CoinShare;
use crate::framework::DatabaseProcessor;
use compact_str::CompactString;
use kanau::processor::Processor;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct Participant {
    pub event_id: i64,
    pub user_id: i64,
    pub coins: i64,
}

/// Participant joined with directory display fields, the shape winner
/// listings are reported in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct ParticipantDetail {
    pub user_id: i64,
    pub username: CompactString,
    pub coins: i64,
    pub payout_address: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct GetEventParticipants {
    pub event_id: i64,
}

impl Processor<GetEventParticipants> for DatabaseProcessor {
    type Output = Vec<Participant>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventParticipants")]
    async fn process(&self, query: GetEventParticipants) -> Result<Vec<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT event_id, user_id, coins FROM participant WHERE event_id = $1 ORDER BY user_id",
        )
        .bind(query.event_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetParticipantDetails {
    pub event_id: i64,
}

impl Processor<GetParticipantDetails> for DatabaseProcessor {
    type Output = Vec<ParticipantDetail>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetParticipantDetails")]
    async fn process(
        &self,
        query: GetParticipantDetails,
    ) -> Result<Vec<ParticipantDetail>, sqlx::Error> {
        sqlx::query_as::<_, ParticipantDetail>(
            "SELECT p.user_id, u.username, p.coins, u.payout_address \
             FROM participant p JOIN bot_user u ON u.id = p.user_id \
             WHERE p.event_id = $1 ORDER BY p.user_id",
        )
        .bind(query.event_id)
        .fetch_all(&self.pool)
        .await
    }
}

impl Participant {
    /// Bulk-insert the allocation produced for an event start. Runs inside
    /// the start transaction so a failure rolls the whole transition back.
    pub async fn insert_many_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: i64,
        shares: &[CoinShare],
    ) -> Result<u64, sqlx::Error> {
        if shares.is_empty() {
            return Ok(0);
        }

        let mut query_builder =
            sqlx::QueryBuilder::new("INSERT INTO participant (event_id, user_id, coins) ");
        query_builder.push_values(shares, |mut b, share| {
            b.push_bind(event_id)
                .push_bind(share.user_id)
                .push_bind(share.coins);
        });

        let result = query_builder.build().execute(&mut **tx).await?;
        Ok(result.rows_affected())
    }
}
