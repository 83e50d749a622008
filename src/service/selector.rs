//! Draw selector: uniform sampling without replacement.
//!
//! Selection is separate from commit so it can be tested against a seeded
//! generator. Production draws pass [`rand::rng()`], the thread-local
//! ChaCha generator reseeded from the operating system, which no caller can
//! seed or predict.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::domain::{ParticipantId, RaffleId, Winner};
use crate::error::EngineError;

/// Picks up to `requested` winners from `pool`.
///
/// The pool is shuffled with a full Fisher–Yates pass and the first
/// `min(requested, pool.len())` entries win, position 1 first.
///
/// # Errors
///
/// Returns [`EngineError::InsufficientParticipants`] when `pool` is empty,
/// or [`EngineError::Validation`] when `requested` is zero.
pub fn select_winners<R: Rng + ?Sized>(
    raffle_id: RaffleId,
    pool: &[ParticipantId],
    requested: u32,
    rng: &mut R,
) -> Result<Vec<Winner>, EngineError> {
    if requested == 0 {
        return Err(EngineError::validation("count", "must be at least 1"));
    }
    if pool.is_empty() {
        return Err(EngineError::InsufficientParticipants(raffle_id));
    }

    let take = usize::try_from(requested).map_or(pool.len(), |n| n.min(pool.len()));
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);

    Ok(shuffled
        .into_iter()
        .take(take)
        .zip(1u32..)
        .map(|(participant_id, position)| Winner {
            participant_id,
            position,
        })
        .collect())
}
