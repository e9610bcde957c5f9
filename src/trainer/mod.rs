//! # GeneticTrainer
//!
//! The controller-facing surface of the multi-threaded trainer. The trainer
//! owns the coordinator core, the genome factory, the injected random source
//! and the worker pool; the controlling thread drives it by calling
//! [`iteration`](GeneticTrainer::iteration) repeatedly and reads results
//! through the best-genome accessors.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut trainer = GeneticTrainer::new(population, factory, challenge, options, rng)?;
//! trainer.add_operator(0.9, Arc::new(Crossover))?;
//! trainer.add_operator(0.1, Arc::new(Mutate))?;
//! trainer.create_random_population(5)?;
//!
//! for _ in 0..100 {
//!     trainer.iteration()?;
//! }
//! let best = trainer.best_genome();
//! trainer.finish_training()?;
//! ```
//!
//! ## Reproducibility
//!
//! All randomness derives from the injected [`RandomNumberGenerator`]. A
//! seeded trainer running a single worker thread is reproducible; with more
//! workers, which of two equally scored candidates wins the best-genome slot
//! depends on arrival order, so runs are not bit-for-bit repeatable.

pub mod challenge;
pub mod core;
pub mod options;
pub(crate) mod worker;

pub use self::challenge::Challenge;
pub use self::core::TrainerCore;
pub use self::options::{ComplexityPenalty, TrainerOptions, TrainerOptionsBuilder};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{GeneticError, Result};
use crate::genome::{Genome, GenomeFactory};
use crate::operators::EvolutionaryOperator;
use crate::population::Population;
use crate::rng::RandomNumberGenerator;
use crate::selection::{AdjustedScoreComparator, GenomeComparator, SelectionStrategy, TournamentSelection};
use crate::selector::{GenomeSelector, ThreadedSelector};
use self::worker::WorkerHandle;

/// Coordinates a population-based stochastic search across a pool of worker
/// threads.
///
/// Lifecycle: the worker pool starts lazily on the first
/// [`iteration`](GeneticTrainer::iteration) call and runs until
/// [`finish_training`](GeneticTrainer::finish_training) (or a fatal worker
/// error) tears it down; a later `iteration` call starts a fresh pool.
/// Dropping the trainer performs a best-effort teardown, so embedders that
/// need shutdown failures surfaced should call `finish_training` themselves
/// on every exit path.
pub struct GeneticTrainer<G: Genome + 'static> {
    core: Arc<TrainerCore<G>>,
    factory: Box<dyn GenomeFactory<G>>,
    rng: RandomNumberGenerator,
    workers: Option<Vec<WorkerHandle>>,
    thread_count: usize,
    parallel_threshold: usize,
}

impl<G: Genome + 'static> GeneticTrainer<G> {
    /// Creates a trainer over the given population.
    ///
    /// The comparator direction is taken from the challenge's
    /// [`is_minimizing`](Challenge::is_minimizing); the best-genome slot is
    /// allocated from the factory and stays meaningless until the first
    /// evaluation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the options are invalid (e.g. zero
    /// tournament rounds).
    pub fn new(
        population: Population<G>,
        factory: Box<dyn GenomeFactory<G>>,
        challenge: Box<dyn Challenge<G>>,
        options: TrainerOptions,
        mut rng: RandomNumberGenerator,
    ) -> Result<Self> {
        let comparator = if challenge.is_minimizing() {
            AdjustedScoreComparator::minimizing()
        } else {
            AdjustedScoreComparator::maximizing()
        };
        let strategy = TournamentSelection::new(options.tournament_rounds())?;
        let selector = ThreadedSelector::new(
            Box::new(strategy.clone()),
            Box::new(comparator),
            RandomNumberGenerator::from_seed(rng.next_seed()),
        );

        Self::with_selection(
            population,
            factory,
            challenge,
            options,
            rng,
            Box::new(comparator),
            Box::new(strategy),
            Box::new(selector),
        )
    }

    /// Creates a trainer with a custom selection surface.
    ///
    /// Where [`new`](GeneticTrainer::new) wires up the defaults (adjusted-score
    /// comparator in the challenge's direction, tournament selection, the
    /// in-use-tracking selector), this constructor takes all three seams from
    /// the caller: the `comparator` drives best-genome tracking, the
    /// `strategy` picks parents, and the `selector` hands out replacement
    /// victims. The `tournament_rounds` option is ignored on this path; the
    /// strategy carries its own parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn with_selection(
        population: Population<G>,
        factory: Box<dyn GenomeFactory<G>>,
        challenge: Box<dyn Challenge<G>>,
        options: TrainerOptions,
        rng: RandomNumberGenerator,
        comparator: Box<dyn GenomeComparator<G>>,
        strategy: Box<dyn SelectionStrategy<G>>,
        selector: Box<dyn GenomeSelector<G>>,
    ) -> Result<Self> {
        let best_genome = factory.factor();

        let core = TrainerCore::new(
            population,
            best_genome,
            challenge,
            comparator,
            strategy,
            selector,
            *options.complexity_penalty(),
        );

        Ok(Self {
            core: Arc::new(core),
            factory,
            rng,
            workers: None,
            thread_count: options.thread_count(),
            parallel_threshold: options.parallel_threshold(),
        })
    }

    /// Registers an evolutionary operator with the given probability weight.
    ///
    /// # Errors
    ///
    /// Returns a configuration error once training has started (the registry
    /// is finalized when the first worker pool comes up).
    pub fn add_operator(
        &self,
        weight: f64,
        operator: Arc<dyn EvolutionaryOperator<G>>,
    ) -> Result<()> {
        self.core.operators().add(weight, operator)
    }

    /// Advances the search by one full population sweep.
    ///
    /// Starts the worker pool on first use, then blocks until workers have
    /// collectively contributed a population's worth of genomes or one of
    /// them reports a fatal error. On error the worker pool is torn down
    /// before the wrapped error is returned; a subsequent call starts over.
    pub fn iteration(&mut self) -> Result<()> {
        if self.workers.is_none() {
            self.startup()?;
        }

        match self.core.wait_for_sweep() {
            Ok(()) => Ok(()),
            Err(error) => {
                if let Err(shutdown_error) = self.finish_training() {
                    warn!(%error, "worker error followed by shutdown failure");
                    return Err(shutdown_error);
                }
                Err(error)
            }
        }
    }

    fn startup(&mut self) -> Result<()> {
        // Finalize exactly once; a pool restarted after finish_training
        // reuses the frozen registry.
        if !self.core.operators().is_finalized() {
            self.core.operators().finalize()?;
        }

        let thread_count = if self.thread_count != 0 {
            self.thread_count
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        };

        self.core.mark_needs_best();

        let workers = (0..thread_count)
            .map(|worker_id| {
                WorkerHandle::spawn(Arc::clone(&self.core), self.rng.next_seed(), worker_id)
            })
            .collect();
        self.workers = Some(workers);
        debug!(threads = thread_count, "worker pool started");
        Ok(())
    }

    /// Tears down the worker pool: requests termination of every worker,
    /// then joins each. Idempotent; with no workers running it is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a shutdown error if a worker cannot be joined (it panicked).
    /// That worker is leaked; the condition is fatal for the host, not
    /// something to retry.
    pub fn finish_training(&mut self) -> Result<()> {
        let Some(workers) = self.workers.take() else {
            return Ok(());
        };

        for worker in &workers {
            worker.request_terminate();
        }
        for worker in workers {
            worker.join()?;
        }
        debug!("worker pool stopped");
        Ok(())
    }

    /// Whether the worker pool is currently running.
    pub fn is_running(&self) -> bool {
        self.workers.is_some()
    }

    /// One-time population bootstrap: fills every slot with a random genome
    /// up to `max_depth`, scores them, and seeds the best-genome slot.
    ///
    /// Takes `&mut self`, so it cannot run concurrently with `iteration`.
    pub fn create_random_population(&mut self, max_depth: usize) -> Result<()> {
        self.core.create_random_population(
            self.factory.as_ref(),
            &mut self.rng,
            max_depth,
            self.parallel_threshold,
        )
    }

    /// Returns a clone of the best genome observed so far.
    pub fn best_genome(&self) -> G {
        self.core.best_genome()
    }

    /// Deep-copies the best genome into `target`.
    pub fn copy_best_genome(&self, target: &mut G) {
        self.core.copy_best_genome(target);
    }

    /// Raw score of the best genome observed so far.
    pub fn best_score(&self) -> f64 {
        self.core.best_score()
    }

    /// Number of completed sweeps.
    pub fn iteration_number(&self) -> usize {
        self.core.iteration_number()
    }

    /// The fatal error most recently reported by a worker, if any.
    pub fn current_error(&self) -> Option<GeneticError> {
        self.core.current_error()
    }

    /// Sets the worker count for the next pool startup (0 = hardware
    /// concurrency). Has no effect on a pool that is already running.
    pub fn set_thread_count(&mut self, thread_count: usize) {
        self.thread_count = thread_count;
    }

    /// The shared coordinator core.
    ///
    /// External worker implementations hold this handle and call its
    /// `add_genome` / `evaluate_best_genome` / `notify_progress` /
    /// `report_error` / `signal_done` surface.
    pub fn core(&self) -> Arc<TrainerCore<G>> {
        Arc::clone(&self.core)
    }
}

impl<G: Genome + 'static> Drop for GeneticTrainer<G> {
    fn drop(&mut self) {
        if let Err(error) = self.finish_training() {
            // Drop must not panic; embedders that need this surfaced call
            // finish_training explicitly.
            warn!(%error, "worker pool teardown failed during drop");
        }
    }
}
