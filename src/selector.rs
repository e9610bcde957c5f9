//! # Genome Selector
//!
//! The replacement-victim protocol is two-phase: the coordinator asks the
//! selector for an anti-selected slot while holding the population lock,
//! overwrites that slot, and releases it back to the selector afterwards,
//! outside the population lock. The selector keeps its own bookkeeping lock
//! so that `release_slot` never needs to touch the coordinator's mutex.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::Population;
use crate::rng::RandomNumberGenerator;
use crate::selection::{GenomeComparator, SelectionStrategy};

/// Hands out population slots to be overwritten, one holder at a time.
///
/// Both methods are called with the coordinator's lock held or about to be
/// released; implementations must only take their own internal locks.
pub trait GenomeSelector<G: Genome>: Send + Sync {
    /// Anti-selects a population slot to use as a replacement victim.
    ///
    /// The returned slot is considered in use until released.
    ///
    /// # Errors
    ///
    /// Returns a selection error if every slot is currently in use.
    fn anti_select_slot(&self, population: &Population<G>) -> Result<usize>;

    /// Returns a previously anti-selected slot to the selectable pool.
    fn release_slot(&self, slot: usize);
}

/// Default selector: tournament anti-selection with in-use tracking.
///
/// Tracks handed-out slots in a `HashSet` behind the selector's own mutex so
/// that a slot being mutated is never offered to a second caller.
pub struct ThreadedSelector<G: Genome> {
    strategy: Box<dyn SelectionStrategy<G>>,
    comparator: Box<dyn GenomeComparator<G>>,
    inner: Mutex<SelectorState>,
}

struct SelectorState {
    rng: RandomNumberGenerator,
    in_use: HashSet<usize>,
}

impl<G: Genome> ThreadedSelector<G> {
    /// Creates a selector from a strategy, a comparator, and a seeded RNG.
    pub fn new(
        strategy: Box<dyn SelectionStrategy<G>>,
        comparator: Box<dyn GenomeComparator<G>>,
        rng: RandomNumberGenerator,
    ) -> Self {
        Self {
            strategy,
            comparator,
            inner: Mutex::new(SelectorState {
                rng,
                in_use: HashSet::new(),
            }),
        }
    }
}

impl<G: Genome> GenomeSelector<G> for ThreadedSelector<G> {
    fn anti_select_slot(&self, population: &Population<G>) -> Result<usize> {
        let mut state = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if state.in_use.len() >= population.size() {
            return Err(GeneticError::Selection(
                "All population slots are currently held by the selector".to_string(),
            ));
        }

        loop {
            let slot = self
                .strategy
                .anti_select(population, self.comparator.as_ref(), &mut state.rng)?;
            if state.in_use.insert(slot) {
                return Ok(slot);
            }
        }
    }

    fn release_slot(&self, slot: usize) {
        let mut state = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.in_use.remove(&slot);
    }
}
