//! # TrainerCore
//!
//! The synchronization heart of the trainer. One mutex/condvar pair owned
//! here protects everything workers and the controller share: the population,
//! the best-genome slot, the per-sweep progress counter, the iteration
//! counter, and the captured worker error. All population mutation flows
//! through [`add_genome`](TrainerCore::add_genome), which is the single
//! serialization point of the whole system.
//!
//! The controller blocks in [`wait_for_sweep`](TrainerCore::wait_for_sweep)
//! until workers have collectively contributed more genomes than the
//! population holds (one full sweep), or until any worker reports a fatal
//! error — error reports wake the barrier immediately, regardless of how far
//! the sweep has progressed.

use std::sync::{Condvar, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::{GeneticError, Result};
use crate::genome::{Genome, GenomeFactory};
use crate::operators::OperatorRegistry;
use crate::population::Population;
use crate::rng::RandomNumberGenerator;
use crate::selection::{GenomeComparator, SelectionStrategy};
use crate::selector::GenomeSelector;
use crate::trainer::challenge::Challenge;
use crate::trainer::options::ComplexityPenalty;

/// Everything protected by the coordinator's mutex.
struct TrainState<G: Genome> {
    population: Population<G>,
    best_genome: G,
    needs_best: bool,
    iteration_number: usize,
    sub_iteration_counter: usize,
    current_error: Option<GeneticError>,
}

/// Shared coordinator state: the lock, the condition, and the collaborators
/// workers call into. Lives behind an `Arc` once the worker pool starts.
pub struct TrainerCore<G: Genome> {
    state: Mutex<TrainState<G>>,
    iteration_cond: Condvar,
    challenge: Box<dyn Challenge<G>>,
    comparator: Box<dyn GenomeComparator<G>>,
    strategy: Box<dyn SelectionStrategy<G>>,
    selector: Box<dyn GenomeSelector<G>>,
    operators: OperatorRegistry<G>,
    penalty: ComplexityPenalty,
}

impl<G: Genome> TrainerCore<G> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        population: Population<G>,
        best_genome: G,
        challenge: Box<dyn Challenge<G>>,
        comparator: Box<dyn GenomeComparator<G>>,
        strategy: Box<dyn SelectionStrategy<G>>,
        selector: Box<dyn GenomeSelector<G>>,
        penalty: ComplexityPenalty,
    ) -> Self {
        Self {
            state: Mutex::new(TrainState {
                population,
                best_genome,
                needs_best: true,
                iteration_number: 0,
                sub_iteration_counter: 0,
                current_error: None,
            }),
            iteration_cond: Condvar::new(),
            challenge,
            comparator,
            strategy,
            selector,
            operators: OperatorRegistry::new(),
            penalty,
        }
    }

    // Worker failures travel through `current_error`, not through unwinding,
    // so a poisoned guard still holds consistent state; the panic itself
    // surfaces as a Shutdown error when the worker is joined.
    fn lock_state(&self) -> MutexGuard<'_, TrainState<G>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The evolutionary-operator registry.
    pub fn operators(&self) -> &OperatorRegistry<G> {
        &self.operators
    }

    /// Blocks until a full sweep completes or a worker reports an error.
    ///
    /// Waits on the condition variable in a predicate loop: a wakeup that
    /// left neither the iteration counter advanced nor the error field set is
    /// spurious and re-waits.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Worker` wrapping the reported error. The stored
    /// error is left in place for inspection via
    /// [`current_error`](TrainerCore::current_error).
    pub fn wait_for_sweep(&self) -> Result<()> {
        let mut state = self.lock_state();
        let starting_iteration = state.iteration_number;

        loop {
            if let Some(error) = &state.current_error {
                return Err(GeneticError::Worker(error.to_string()));
            }
            if state.iteration_number != starting_iteration {
                return Ok(());
            }
            state = self
                .iteration_cond
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Inserts a batch of candidate genomes into the population.
    ///
    /// For each of the `count` candidates starting at `index`: rejects it as
    /// fatal if its size exceeds the population's maximum (the batch stops
    /// there, earlier insertions stay in place), otherwise anti-selects a
    /// victim slot, runs the population's rewrite hook, overwrites the victim
    /// and re-evaluates the best-genome slot against the insertion.
    ///
    /// The last victim slot is released back to the selector after the lock
    /// is dropped, since release takes the selector's own lock. Matching the
    /// original trainer, only the final victim of a multi-candidate batch is
    /// released; callers that submit one candidate per call (as the built-in
    /// worker does) are unaffected.
    ///
    /// An `index`/`count` pair that does not describe a valid range of the
    /// batch is a configuration error; nothing is inserted.
    pub fn add_genome(&self, batch: &[G], index: usize, count: usize) -> Result<()> {
        let candidates = index
            .checked_add(count)
            .and_then(|end| batch.get(index..end))
            .ok_or_else(|| {
                GeneticError::Configuration(format!(
                    "Genome batch range {}..{} is out of bounds for a batch of {}",
                    index,
                    index.saturating_add(count),
                    batch.len()
                ))
            })?;

        let mut last_victim = None;
        let result = self.add_genome_locked(candidates, &mut last_victim);
        if let Some(slot) = last_victim {
            self.selector.release_slot(slot);
        }
        result
    }

    fn add_genome_locked(&self, candidates: &[G], last_victim: &mut Option<usize>) -> Result<()> {
        let mut guard = self.lock_state();
        let state = &mut *guard;

        for candidate in candidates {
            if candidate.size() > state.population.max_individual_size() {
                return Err(GeneticError::OversizedGenome {
                    size: candidate.size(),
                    max: state.population.max_individual_size(),
                });
            }

            let slot = self.selector.anti_select_slot(&state.population)?;
            *last_victim = Some(slot);

            let mut candidate = candidate.clone();
            state.population.rewrite(&mut candidate);
            state.population.get_mut(slot).copy_from(&candidate);

            let inserted = state.population.get_mut(slot);
            Self::evaluate_into_best(
                &self.penalty,
                self.comparator.as_ref(),
                &mut state.best_genome,
                &mut state.needs_best,
                inserted,
            );
        }
        Ok(())
    }

    fn evaluate_into_best(
        penalty: &ComplexityPenalty,
        comparator: &dyn GenomeComparator<G>,
        best_genome: &mut G,
        needs_best: &mut bool,
        genome: &mut G,
    ) {
        let adjusted = penalty.adjust(genome.score(), genome.size());
        genome.set_adjusted_score(adjusted);

        if *needs_best || comparator.is_better(genome, best_genome) {
            best_genome.copy_from(genome);
            *needs_best = false;
        }
    }

    /// Computes the genome's adjusted score and promotes it to the
    /// best-genome slot if it is strictly better than the current best (or
    /// no best has been recorded yet). Safe to call from any thread.
    pub fn evaluate_best_genome(&self, genome: &mut G) {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        Self::evaluate_into_best(
            &self.penalty,
            self.comparator.as_ref(),
            &mut state.best_genome,
            &mut state.needs_best,
            genome,
        );
    }

    /// Deep-copies the best-genome slot into `target`.
    ///
    /// Holds the same lock as every best-genome write, so the copy is always
    /// a single consistent snapshot.
    pub fn copy_best_genome(&self, target: &mut G) {
        let state = self.lock_state();
        target.copy_from(&state.best_genome);
    }

    /// Returns a clone of the best-genome slot.
    pub fn best_genome(&self) -> G {
        self.lock_state().best_genome.clone()
    }

    /// Raw score of the best genome observed so far.
    pub fn best_score(&self) -> f64 {
        self.lock_state().best_genome.score()
    }

    /// Number of completed sweeps.
    pub fn iteration_number(&self) -> usize {
        self.lock_state().iteration_number
    }

    /// The error reported by a worker, if any.
    pub fn current_error(&self) -> Option<GeneticError> {
        self.lock_state().current_error.clone()
    }

    /// Number of genomes in the population.
    pub fn population_size(&self) -> usize {
        self.lock_state().population.size()
    }

    /// Records one contributed genome toward the current sweep.
    ///
    /// When the counter exceeds the population size the sweep is complete:
    /// the counter resets, the iteration number increments, and the barrier
    /// is signalled.
    pub fn notify_progress(&self) {
        let mut state = self.lock_state();
        state.sub_iteration_counter += 1;
        if state.sub_iteration_counter > state.population.size() {
            state.sub_iteration_counter = 0;
            state.iteration_number += 1;
            debug!(iteration = state.iteration_number, "sweep complete");
            self.iteration_cond.notify_all();
        }
    }

    /// Captures a worker's fatal error and wakes the barrier immediately,
    /// regardless of sweep progress.
    pub fn report_error(&self, error: GeneticError) {
        let mut state = self.lock_state();
        warn!(%error, "worker reported fatal error");
        state.current_error = Some(error);
        self.iteration_cond.notify_all();
    }

    /// Wakes the barrier without changing any state.
    ///
    /// Workers call this as they exit so a controller blocked mid-sweep
    /// re-checks its predicate during teardown.
    pub fn signal_done(&self) {
        let state = self.lock_state();
        self.iteration_cond.notify_all();
        drop(state);
    }

    /// Marks the best-genome slot as not yet meaningfully populated.
    ///
    /// Called on worker-pool startup; the next evaluation repopulates it.
    pub(crate) fn mark_needs_best(&self) {
        self.lock_state().needs_best = true;
    }

    /// Clones `count` tournament-selected parents out of the population.
    pub fn select_parents(&self, rng: &mut RandomNumberGenerator, count: usize) -> Result<Vec<G>> {
        let state = self.lock_state();
        (0..count)
            .map(|_| {
                let slot = self
                    .strategy
                    .select(&state.population, self.comparator.as_ref(), rng)?;
                Ok(state.population.get(slot).clone())
            })
            .collect()
    }

    /// Scores a genome through the challenge, outside any lock.
    ///
    /// # Errors
    ///
    /// Returns a fitness-calculation error if the challenge produces a
    /// non-finite score.
    pub fn score_genome(&self, genome: &mut G) -> Result<()> {
        let score = self.challenge.score(genome);
        if !score.is_finite() {
            return Err(GeneticError::FitnessCalculation(format!(
                "Non-finite fitness score encountered: {}",
                score
            )));
        }
        genome.set_score(score);
        Ok(())
    }

    /// Fills every population slot with a random genome, scores them, then
    /// evaluates each against the best-genome slot so the best-known solution
    /// reflects the initial population before any worker runs.
    ///
    /// Bulk scoring runs on the rayon pool when the population is at least
    /// `parallel_threshold` genomes; smaller populations are scored inline.
    pub(crate) fn create_random_population<F>(
        &self,
        factory: &F,
        rng: &mut RandomNumberGenerator,
        max_depth: usize,
        parallel_threshold: usize,
    ) -> Result<()>
    where
        F: GenomeFactory<G> + ?Sized,
    {
        use rayon::prelude::*;

        let mut guard = self.lock_state();
        let state = &mut *guard;

        for slot in state.population.genomes_mut() {
            *slot = factory.factor_random(rng, max_depth);
        }

        if state.population.size() >= parallel_threshold {
            state
                .population
                .as_mut_slice()
                .par_iter_mut()
                .try_for_each(|genome| self.score_genome(genome))?;
        } else {
            for genome in state.population.genomes_mut() {
                self.score_genome(genome)?;
            }
        }

        for slot in 0..state.population.size() {
            let genome = state.population.get_mut(slot);
            Self::evaluate_into_best(
                &self.penalty,
                self.comparator.as_ref(),
                &mut state.best_genome,
                &mut state.needs_best,
                genome,
            );
        }
        Ok(())
    }
}

impl<G: Genome> std::fmt::Debug for TrainerCore<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("TrainerCore")
            .field("iteration_number", &state.iteration_number)
            .field("sub_iteration_counter", &state.sub_iteration_counter)
            .field("population_size", &state.population.size())
            .field("has_error", &state.current_error.is_some())
            .finish()
    }
}
