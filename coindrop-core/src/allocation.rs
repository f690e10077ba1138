//! Coin pool allocation.
//!
//! Splits an event's pool across the eligible users present at start time.
//! Every user gets `pool / count`; the `pool % count` leftover coins go to
//! that many distinct users, sampled without replacement, so the shares
//! always sum to the pool exactly.

use crate::entities::bot_user::BotUser;
use crate::entities::event::GiveawayEvent;
use crate::entities::participant::Participant;
use crate::randomness::SharedRng;
use rand::Rng;
use tracing::debug;

/// One user's allocation for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinShare {
    pub user_id: i64,
    pub coins: i64,
}

/// Split `coin_pool` across `user_ids`.
///
/// An empty user set yields an empty allocation; that is not an error. The
/// pool must already be validated non-negative.
pub fn split_pool<R: Rng + ?Sized>(rng: &mut R, coin_pool: i64, user_ids: &[i64]) -> Vec<CoinShare> {
    if user_ids.is_empty() {
        return Vec::new();
    }

    let count = user_ids.len() as i64;
    let base = coin_pool / count;
    let remainder = (coin_pool % count) as usize;

    let mut shares: Vec<CoinShare> = user_ids
        .iter()
        .map(|&user_id| CoinShare {
            user_id,
            coins: base,
        })
        .collect();

    for index in rand::seq::index::sample(rng, user_ids.len(), remainder) {
        shares[index].coins += 1;
    }

    shares
}

/// Snapshot the eligible users and materialize their Participant rows for
/// `event`, inside the caller's start transaction. Returns the number of
/// participants enrolled.
pub async fn allocate_participants_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    rng: &SharedRng,
    event: &GiveawayEvent,
) -> Result<usize, sqlx::Error> {
    let user_ids = BotUser::eligible_ids_tx(tx).await?;
    if user_ids.is_empty() {
        debug!(event_id = event.id, "No eligible users, event starts empty");
        return Ok(0);
    }

    let shares = rng.with(|r| split_pool(r, event.coins, &user_ids));
    Participant::insert_many_tx(tx, event.id, &shares).await?;
    Ok(shares.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn users(count: usize) -> Vec<i64> {
        (1..=count as i64).collect()
    }

    #[test]
    fn shares_sum_to_pool_exactly() {
        let mut rng = StdRng::seed_from_u64(1);
        for pool in [0, 1, 7, 10, 100, 1001] {
            for count in [1, 2, 3, 7, 50] {
                let shares = split_pool(&mut rng, pool, &users(count));
                let total: i64 = shares.iter().map(|s| s.coins).sum();
                assert_eq!(total, pool, "pool={pool} count={count}");
                assert_eq!(shares.len(), count);
            }
        }
    }

    #[test]
    fn remainder_goes_to_exactly_that_many_users() {
        let mut rng = StdRng::seed_from_u64(2);
        // 100 / 3 = 33 rem 1: one user gets 34, the others 33.
        let shares = split_pool(&mut rng, 100, &users(3));
        let bonus = shares.iter().filter(|s| s.coins == 34).count();
        let base = shares.iter().filter(|s| s.coins == 33).count();
        assert_eq!(bonus, 1);
        assert_eq!(base, 2);
    }

    #[test]
    fn divisible_pool_gives_equal_shares() {
        let mut rng = StdRng::seed_from_u64(3);
        let shares = split_pool(&mut rng, 12, &users(4));
        assert!(shares.iter().all(|s| s.coins == 3));
    }

    #[test]
    fn pool_smaller_than_user_count() {
        let mut rng = StdRng::seed_from_u64(4);
        // 2 coins across 5 users: two users get 1, the rest 0.
        let shares = split_pool(&mut rng, 2, &users(5));
        let winners = shares.iter().filter(|s| s.coins == 1).count();
        let zeros = shares.iter().filter(|s| s.coins == 0).count();
        assert_eq!(winners, 2);
        assert_eq!(zeros, 3);
    }

    #[test]
    fn empty_user_set_allocates_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(split_pool(&mut rng, 100, &[]).is_empty());
    }

    #[test]
    fn zero_pool_allocates_zero_to_everyone() {
        let mut rng = StdRng::seed_from_u64(6);
        let shares = split_pool(&mut rng, 0, &users(3));
        assert!(shares.iter().all(|s| s.coins == 0));
    }

    #[test]
    fn every_user_appears_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let ids = users(10);
        let shares = split_pool(&mut rng, 23, &ids);
        let mut seen: Vec<i64> = shares.iter().map(|s| s.user_id).collect();
        seen.sort_unstable();
        assert_eq!(seen, ids);
    }
}
