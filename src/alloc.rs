//! Author id allocation.
//!
//! Allocators never keep a set of used ids between calls: every call asks the
//! store for the current max / count / presence (`AuthorIds`).

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{IdStrategy, StoreConfig};
use crate::error::StoreError;
use crate::metrics::{record_alloc_draw, record_alloc_widen};
use crate::model::AuthorId;

/// Draws before the random allocator gives up sampling and scans for a slot.
pub const MAX_RANDOM_DRAWS: u32 = 4096;

/// Read-only view of the author relation needed by allocators.
pub trait AuthorIds {
    fn max_author_id(&self) -> Option<AuthorId>;
    fn author_count(&self) -> usize;
    fn author_exists(&self, id: AuthorId) -> bool;
}

pub trait IdAllocator: Send {
    fn allocate(&mut self, ids: &dyn AuthorIds) -> Result<AuthorId, StoreError>;
}

/// Smallest `10^k - 1` that is `>= current_max` (at least 9).
/// `None` on i64 overflow.
pub fn width_bound(current_max: AuthorId) -> Option<AuthorId> {
    let mut bound: AuthorId = 9;
    while bound < current_max {
        bound = bound.checked_mul(10)?.checked_add(9)?;
    }
    Some(bound)
}

/// Upper bound for a draw given the current relation: the digit-width bound,
/// widened once more when the ids of that width are all taken.
pub fn sampling_bound(ids: &dyn AuthorIds) -> Result<AuthorId, StoreError> {
    let current_max = ids.max_author_id().unwrap_or(0);
    let mut bound = width_bound(current_max).ok_or(StoreError::IdSpaceExhausted)?;
    if ids.author_count() as u64 >= bound as u64 {
        bound = bound
            .checked_mul(10)
            .and_then(|b| b.checked_add(9))
            .ok_or(StoreError::IdSpaceExhausted)?;
        record_alloc_widen();
        debug!("alloc: id width saturated, widened bound to {}", bound);
    }
    Ok(bound)
}

/// Random ids within the current digit width of the largest existing id.
pub struct RandomWidthAllocator {
    rng: StdRng,
}

impl RandomWidthAllocator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomWidthAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator for RandomWidthAllocator {
    fn allocate(&mut self, ids: &dyn AuthorIds) -> Result<AuthorId, StoreError> {
        let bound = sampling_bound(ids)?;

        for _ in 0..MAX_RANDOM_DRAWS {
            let candidate = self.rng.gen_range(1..=bound);
            record_alloc_draw();
            if !ids.author_exists(candidate) {
                return Ok(candidate);
            }
        }

        // Почти заполненная ширина: ищем первый свободный слот линейно.
        debug!(
            "alloc: {} draws missed within [1, {}], scanning",
            MAX_RANDOM_DRAWS, bound
        );
        (1..=bound)
            .find(|id| !ids.author_exists(*id))
            .ok_or(StoreError::IdSpaceExhausted)
    }
}

/// Deterministic ids: `max + 1`.
#[derive(Debug, Default)]
pub struct SequentialAllocator;

impl IdAllocator for SequentialAllocator {
    fn allocate(&mut self, ids: &dyn AuthorIds) -> Result<AuthorId, StoreError> {
        match ids.max_author_id() {
            None => Ok(1),
            Some(m) if m < 1 => Ok(1),
            Some(m) => m.checked_add(1).ok_or(StoreError::IdSpaceExhausted),
        }
    }
}

/// Allocator selected by the configuration.
pub fn allocator_from_config(cfg: &StoreConfig) -> Box<dyn IdAllocator> {
    match cfg.author_ids {
        IdStrategy::Sequential => Box::new(SequentialAllocator),
        IdStrategy::Random => match cfg.author_id_seed {
            Some(seed) => Box::new(RandomWidthAllocator::with_seed(seed)),
            None => Box::new(RandomWidthAllocator::new()),
        },
    }
}
