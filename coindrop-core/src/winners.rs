//! Winner selection.
//!
//! A draw is recorded before it is returned, so repeating the call — from a
//! retrying operator or a concurrent duplicate request — always yields the
//! stored set instead of re-rolling. Draws are without replacement: a user
//! cannot occupy two winner slots.

use crate::entities::event::GetEventById;
use crate::entities::participant::{GetEventParticipants, GetParticipantDetails, ParticipantDetail};
use crate::entities::winner_selection::{
    DeleteWinnerSelection, GetWinnerSelection, InsertWinnerSelection,
};
use crate::error::CoreError;
use crate::framework::DatabaseProcessor;
use crate::randomness::SharedRng;
use kanau::processor::Processor;
use rand::Rng;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, info};

/// Draw `requested` distinct winners from `candidates`.
///
/// Clamps to the candidate count, so asking for more winners than there are
/// participants returns everyone.
pub fn draw_winners<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[i64],
    requested: usize,
) -> Vec<i64> {
    let n = requested.min(candidates.len());
    rand::seq::index::sample(rng, candidates.len(), n)
        .iter()
        .map(|index| candidates[index])
        .collect()
}

/// Idempotent winner draws over ended events.
#[derive(Clone)]
pub struct WinnerSelector {
    pool: PgPool,
    rng: SharedRng,
}

impl WinnerSelector {
    pub fn new(pool: PgPool, rng: SharedRng) -> Self {
        Self { pool, rng }
    }

    fn processor(&self) -> DatabaseProcessor {
        DatabaseProcessor {
            pool: self.pool.clone(),
        }
    }

    /// Return the winners for `event_id`, drawing them first if no selection
    /// exists yet. `n` is clamped to the participant count.
    pub async fn select(
        &self,
        event_id: i64,
        n: i64,
    ) -> Result<Vec<ParticipantDetail>, CoreError> {
        if n <= 0 {
            return Err(CoreError::InvalidArgument(format!(
                "winner count must be positive, got {n}"
            )));
        }

        let processor = self.processor();
        if processor.process(GetEventById { event_id }).await?.is_none() {
            return Err(CoreError::NotFound("event"));
        }

        if let Some(selection) = processor.process(GetWinnerSelection { event_id }).await? {
            debug!(event_id, "Returning previously drawn winners");
            return self.resolve(event_id, &selection.winner_user_ids).await;
        }

        let participants = processor.process(GetEventParticipants { event_id }).await?;
        let candidates: Vec<i64> = participants.iter().map(|p| p.user_id).collect();
        let winner_user_ids = self.rng.with(|r| draw_winners(r, &candidates, n as usize));

        let inserted = processor
            .process(InsertWinnerSelection {
                event_id,
                winner_user_ids: winner_user_ids.clone(),
            })
            .await?;

        if !inserted {
            // Lost a race to a concurrent draw; the stored selection wins.
            let selection = processor
                .process(GetWinnerSelection { event_id })
                .await?
                .ok_or(CoreError::NotFound("winner selection"))?;
            debug!(event_id, "Concurrent draw committed first");
            return self.resolve(event_id, &selection.winner_user_ids).await;
        }

        info!(
            event_id,
            winners = winner_user_ids.len(),
            participants = candidates.len(),
            "Drew winners"
        );
        self.resolve(event_id, &winner_user_ids).await
    }

    /// Discard the recorded selection for `event_id`, allowing one re-draw.
    /// Resetting an event that never had a draw is a no-op.
    pub async fn reset(&self, event_id: i64) -> Result<(), CoreError> {
        let processor = self.processor();
        if processor.process(GetEventById { event_id }).await?.is_none() {
            return Err(CoreError::NotFound("event"));
        }

        let deleted = processor.process(DeleteWinnerSelection { event_id }).await?;
        if deleted == 0 {
            debug!(event_id, "No winner selection to reset");
        } else {
            info!(event_id, "Winner selection reset");
        }
        Ok(())
    }

    /// Resolve stored winner ids to participant records, preserving the
    /// stored draw order.
    async fn resolve(
        &self,
        event_id: i64,
        winner_user_ids: &[i64],
    ) -> Result<Vec<ParticipantDetail>, CoreError> {
        let details = self
            .processor()
            .process(GetParticipantDetails { event_id })
            .await?;
        let by_user: HashMap<i64, ParticipantDetail> =
            details.into_iter().map(|d| (d.user_id, d)).collect();
        Ok(winner_user_ids
            .iter()
            .filter_map(|id| by_user.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn draws_are_distinct() {
        let mut rng = StdRng::seed_from_u64(11);
        let candidates: Vec<i64> = (1..=20).collect();
        for _ in 0..50 {
            let drawn = draw_winners(&mut rng, &candidates, 5);
            let unique: HashSet<i64> = drawn.iter().copied().collect();
            assert_eq!(drawn.len(), 5);
            assert_eq!(unique.len(), 5);
        }
    }

    #[test]
    fn requested_count_clamps_to_participants() {
        let mut rng = StdRng::seed_from_u64(12);
        let candidates: Vec<i64> = vec![7, 8, 9];
        let drawn = draw_winners(&mut rng, &candidates, 10);
        let unique: HashSet<i64> = drawn.iter().copied().collect();
        assert_eq!(drawn.len(), 3);
        assert_eq!(unique, candidates.iter().copied().collect());
    }

    #[test]
    fn no_candidates_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(13);
        assert!(draw_winners(&mut rng, &[], 3).is_empty());
    }

    #[test]
    fn seeded_draws_reproduce() {
        let candidates: Vec<i64> = (1..=10).collect();
        let mut a = StdRng::seed_from_u64(14);
        let mut b = StdRng::seed_from_u64(14);
        assert_eq!(
            draw_winners(&mut a, &candidates, 4),
            draw_winners(&mut b, &candidates, 4)
        );
    }

    #[test]
    fn winners_come_from_the_candidate_set() {
        let mut rng = StdRng::seed_from_u64(15);
        let candidates: Vec<i64> = vec![100, 200, 300, 400];
        let drawn = draw_winners(&mut rng, &candidates, 2);
        assert!(drawn.iter().all(|id| candidates.contains(id)));
    }
}
