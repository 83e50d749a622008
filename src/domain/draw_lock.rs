//! Per-raffle mutual exclusion for draw execution and reversal.
//!
//! [`DrawLocks`] tracks the set of raffles that currently have a draw or
//! reversal running. Acquisition never waits: a second caller for the same
//! raffle gets [`EngineError::DrawInProgress`] immediately, while different
//! raffles never contend. A raffle is only present in the set while its
//! [`DrawPermit`] is alive, so the registry never outgrows the number of
//! operations in flight.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::RaffleId;
use crate::error::EngineError;

type HeldSet = Arc<Mutex<HashSet<RaffleId>>>;

/// Registry of per-raffle draw locks.
///
/// # Concurrency
///
/// - At most one [`DrawPermit`] exists per raffle at any time.
/// - Permits for different raffles are independent.
/// - The permit is released when dropped, including when the owning
///   request future is abandoned.
#[derive(Debug, Default, Clone)]
pub struct DrawLocks {
    held: HeldSet,
}

/// Exclusive right to run a draw or reversal on one raffle.
#[derive(Debug)]
pub struct DrawPermit {
    raffle_id: RaffleId,
    held: HeldSet,
}

impl Drop for DrawPermit {
    fn drop(&mut self) {
        lock_set(&self.held).remove(&self.raffle_id);
    }
}

impl DrawLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the draw lock for `raffle_id` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DrawInProgress`] if another permit for the
    /// same raffle is alive.
    pub fn try_acquire(&self, raffle_id: RaffleId) -> Result<DrawPermit, EngineError> {
        if !lock_set(&self.held).insert(raffle_id) {
            return Err(EngineError::DrawInProgress(raffle_id));
        }
        Ok(DrawPermit {
            raffle_id,
            held: Arc::clone(&self.held),
        })
    }

    /// Returns `true` if a permit for `raffle_id` is currently held.
    #[cfg(test)]
    pub(crate) fn is_locked(&self, raffle_id: RaffleId) -> bool {
        lock_set(&self.held).contains(&raffle_id)
    }

    /// Number of raffles with a live permit.
    #[cfg(test)]
    pub(crate) fn held_count(&self) -> usize {
        lock_set(&self.held).len()
    }
}

// Every critical section is a single insert, remove or lookup, so a
// poisoned set is still consistent.
fn lock_set(held: &HeldSet) -> MutexGuard<'_, HashSet<RaffleId>> {
    held.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected() {
        let locks = DrawLocks::new();
        let id = RaffleId::new();

        let Ok(_permit) = locks.try_acquire(id) else {
            panic!("first acquire should succeed");
        };
        assert!(locks.is_locked(id));

        let second = locks.try_acquire(id);
        assert!(matches!(second, Err(EngineError::DrawInProgress(r)) if r == id));
        assert!(locks.is_locked(id));
    }

    #[test]
    fn drop_releases_permit_and_entry() {
        let locks = DrawLocks::new();
        let id = RaffleId::new();

        let permit = locks.try_acquire(id);
        assert!(permit.is_ok());
        drop(permit);

        assert!(!locks.is_locked(id));
        assert_eq!(locks.held_count(), 0);
        assert!(locks.try_acquire(id).is_ok());
    }

    #[test]
    fn raffles_are_independent() {
        let locks = DrawLocks::new();
        let a = locks.try_acquire(RaffleId::new());
        let b = locks.try_acquire(RaffleId::new());
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(locks.held_count(), 2);
    }

    #[test]
    fn rejected_acquire_keeps_holder_locked() {
        let locks = DrawLocks::new();
        let id = RaffleId::new();
        let first = locks.try_acquire(id);
        assert!(first.is_ok());

        drop(locks.try_acquire(id));
        assert!(locks.is_locked(id));

        drop(first);
        assert_eq!(locks.held_count(), 0);
    }
}
