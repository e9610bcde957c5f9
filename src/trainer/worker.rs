//! # Worker Threads
//!
//! The built-in generate-evaluate-submit loop. Each worker owns a seeded RNG
//! derived from the trainer's root seed and runs until its terminate flag is
//! raised: pick an operator from the registry, clone parents out of the
//! population, apply the operator outside the lock, score the offspring, then
//! submit them one at a time through `add_genome`, notifying sweep progress
//! per contributed genome.
//!
//! A worker that hits an unrecoverable error reports it to the coordinator
//! exactly once and exits its loop; the report wakes the controller's
//! barrier immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, trace};

use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::rng::RandomNumberGenerator;
use crate::trainer::core::TrainerCore;

/// A running worker thread plus its cooperative-termination flag.
pub(crate) struct WorkerHandle {
    terminate: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawns a worker bound to the given coordinator.
    pub(crate) fn spawn<G: Genome + 'static>(
        core: Arc<TrainerCore<G>>,
        seed: u64,
        worker_id: usize,
    ) -> Self {
        let terminate = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&terminate);
        let handle = std::thread::Builder::new()
            .name(format!("genetrain-worker-{}", worker_id))
            .spawn(move || worker_loop(core, flag, seed, worker_id))
            .expect("failed to spawn worker thread");

        Self { terminate, handle }
    }

    /// Asks the worker's loop to exit at its next check.
    pub(crate) fn request_terminate(&self) {
        self.terminate.store(true, Ordering::Relaxed);
    }

    /// Blocks until the worker thread exits.
    ///
    /// # Errors
    ///
    /// Returns a shutdown error if the worker thread panicked; an unjoined
    /// worker is a leaked thread and is never silently dropped.
    pub(crate) fn join(self) -> Result<()> {
        let name = self
            .handle
            .thread()
            .name()
            .unwrap_or("genetrain-worker")
            .to_string();
        self.handle.join().map_err(|_| {
            GeneticError::Shutdown(format!("Worker thread '{}' panicked before joining", name))
        })
    }
}

fn worker_loop<G: Genome>(
    core: Arc<TrainerCore<G>>,
    terminate: Arc<AtomicBool>,
    seed: u64,
    worker_id: usize,
) {
    let mut rng = RandomNumberGenerator::from_seed(seed);
    trace!(worker_id, "worker started");

    while !terminate.load(Ordering::Relaxed) {
        if let Err(error) = step(&core, &mut rng) {
            debug!(worker_id, %error, "worker stopping on error");
            core.report_error(error);
            break;
        }
    }

    core.signal_done();
    trace!(worker_id, "worker exited");
}

/// One generate-evaluate-submit cycle.
fn step<G: Genome>(core: &TrainerCore<G>, rng: &mut RandomNumberGenerator) -> Result<()> {
    let operator = core.operators().pick(rng)?;
    let parents = core.select_parents(rng, operator.parents_needed())?;
    let offspring = operator.apply(rng, &parents)?;

    for mut child in offspring {
        core.score_genome(&mut child)?;
        core.add_genome(&[child], 0, 1)?;
        core.notify_progress();
    }
    Ok(())
}
