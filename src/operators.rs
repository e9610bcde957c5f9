//! # Evolutionary Operator Registry
//!
//! Workers consult a weighted list of evolutionary operators to decide which
//! operator to apply to the parents they have selected. The registry is
//! append-only until training starts: the trainer finalizes it exactly once
//! before the first worker is spawned, after which it is immutable and can be
//! read from any number of worker threads without locking.
//!
//! The operator algorithms themselves (crossover, mutation, ...) are the
//! embedder's concern; this module only defines the trait seam and the
//! weighted-choice bookkeeping.

use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::rng::RandomNumberGenerator;

/// An evolutionary operator that produces offspring from parent genomes.
///
/// Implementations must be thread-safe: once training starts the same
/// operator instance is invoked concurrently from every worker.
pub trait EvolutionaryOperator<G: Genome>: Send + Sync {
    /// Number of parent genomes the operator consumes.
    fn parents_needed(&self) -> usize;

    /// Number of offspring genomes a single application produces.
    fn offspring_produced(&self) -> usize;

    /// Applies the operator to the given parents.
    ///
    /// # Errors
    ///
    /// An error here is unrecoverable for the worker that raised it and is
    /// funneled to the controller through the trainer's error-report surface.
    fn apply(&self, rng: &mut RandomNumberGenerator, parents: &[G]) -> Result<Vec<G>>;
}

struct WeightedOperator<G: Genome> {
    weight: f64,
    operator: Arc<dyn EvolutionaryOperator<G>>,
}

struct FinalizedOperators<G: Genome> {
    entries: Vec<WeightedOperator<G>>,
    total_weight: f64,
}

/// A weighted, finalize-once list of evolutionary operators.
///
/// Operators are added with a probability weight before training starts.
/// [`finalize`](OperatorRegistry::finalize) freezes the list; adding after
/// finalization, finalizing twice, or finalizing an empty registry are all
/// configuration errors. After finalization, [`pick`](OperatorRegistry::pick)
/// is lock-free.
pub struct OperatorRegistry<G: Genome> {
    pending: Mutex<Vec<WeightedOperator<G>>>,
    finalized: OnceLock<FinalizedOperators<G>>,
}

impl<G: Genome> OperatorRegistry<G> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            finalized: OnceLock::new(),
        }
    }

    /// Adds an operator with the given probability weight.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the registry has already been
    /// finalized, or if the weight is not a positive finite number.
    pub fn add(&self, weight: f64, operator: Arc<dyn EvolutionaryOperator<G>>) -> Result<()> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(GeneticError::Configuration(format!(
                "Operator weight must be a positive finite number, got {}",
                weight
            )));
        }

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Checked under the pending lock: an add racing finalize must either
        // land in the frozen list or fail, never be silently dropped.
        if self.is_finalized() {
            return Err(GeneticError::Configuration(
                "Cannot add an operator after the registry has been finalized".to_string(),
            ));
        }
        pending.push(WeightedOperator { weight, operator });
        Ok(())
    }

    /// Returns whether the registry has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.finalized.get().is_some()
    }

    /// Freezes the registry. Irreversible; called by the trainer before the
    /// first worker starts.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the registry is empty or has already
    /// been finalized.
    pub fn finalize(&self) -> Result<()> {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.is_finalized() {
            return Err(GeneticError::Configuration(
                "Operator registry has already been finalized".to_string(),
            ));
        }
        if pending.is_empty() {
            return Err(GeneticError::Configuration(
                "Cannot finalize an operator registry with no operators".to_string(),
            ));
        }

        let entries = std::mem::take(&mut *pending);
        let total_weight = entries.iter().map(|e| e.weight).sum();
        let finalized = FinalizedOperators {
            entries,
            total_weight,
        };

        // Both checks above ran under the pending lock, so the slot is free.
        self.finalized.set(finalized).map_err(|_| {
            GeneticError::Configuration(
                "Operator registry has already been finalized".to_string(),
            )
        })
    }

    /// Number of registered operators.
    pub fn len(&self) -> usize {
        match self.finalized.get() {
            Some(finalized) => finalized.entries.len(),
            None => self
                .pending
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .len(),
        }
    }

    /// Returns whether the registry holds no operators.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Picks an operator, roulette-style, proportionally to its weight.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the registry has not been finalized.
    pub fn pick(&self, rng: &mut RandomNumberGenerator) -> Result<Arc<dyn EvolutionaryOperator<G>>> {
        let finalized = self.finalized.get().ok_or_else(|| {
            GeneticError::Configuration(
                "Operator registry must be finalized before operators are picked".to_string(),
            )
        })?;

        let mut spin = rng.gen_range(0.0..finalized.total_weight);
        for entry in &finalized.entries {
            if spin < entry.weight {
                return Ok(Arc::clone(&entry.operator));
            }
            spin -= entry.weight;
        }

        // Floating point accumulation can leave spin just past the wheel.
        let last = finalized
            .entries
            .last()
            .ok_or_else(|| GeneticError::Configuration("Operator registry is empty".to_string()))?;
        Ok(Arc::clone(&last.operator))
    }
}

impl<G: Genome> Default for OperatorRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> std::fmt::Debug for OperatorRegistry<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("len", &self.len())
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct TestGenome;

    impl Genome for TestGenome {
        fn score(&self) -> f64 {
            0.0
        }

        fn set_score(&mut self, _score: f64) {}

        fn adjusted_score(&self) -> f64 {
            0.0
        }

        fn set_adjusted_score(&mut self, _score: f64) {}

        fn size(&self) -> usize {
            1
        }

        fn copy_from(&mut self, _other: &Self) {}
    }

    struct CloneFirstParent;

    impl EvolutionaryOperator<TestGenome> for CloneFirstParent {
        fn parents_needed(&self) -> usize {
            1
        }

        fn offspring_produced(&self) -> usize {
            1
        }

        fn apply(
            &self,
            _rng: &mut RandomNumberGenerator,
            parents: &[TestGenome],
        ) -> Result<Vec<TestGenome>> {
            Ok(vec![parents[0].clone()])
        }
    }

    #[test]
    fn test_add_after_finalize_rejected() {
        let registry = OperatorRegistry::<TestGenome>::new();
        registry.add(1.0, Arc::new(CloneFirstParent)).unwrap();
        registry.finalize().unwrap();

        let result = registry.add(1.0, Arc::new(CloneFirstParent));
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_finalize_twice_rejected() {
        let registry = OperatorRegistry::<TestGenome>::new();
        registry.add(1.0, Arc::new(CloneFirstParent)).unwrap();
        registry.finalize().unwrap();

        let error = registry.finalize().unwrap_err();
        assert!(matches!(error, GeneticError::Configuration(_)));
        assert!(error.to_string().contains("already finalized"));
        // The frozen list survives the rejected second finalize.
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_adds_are_never_dropped_by_finalize() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::thread;

        let registry = Arc::new(OperatorRegistry::<TestGenome>::new());
        registry.add(1.0, Arc::new(CloneFirstParent)).unwrap();
        let accepted = Arc::new(AtomicUsize::new(1));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let accepted = Arc::clone(&accepted);
                thread::spawn(move || {
                    for _ in 0..50 {
                        if registry.add(1.0, Arc::new(CloneFirstParent)).is_ok() {
                            accepted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        registry.finalize().unwrap();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every add that reported Ok made it into the frozen list.
        assert_eq!(registry.len(), accepted.load(Ordering::SeqCst));
    }

    #[test]
    fn test_finalize_empty_rejected() {
        let registry = OperatorRegistry::<TestGenome>::new();
        assert!(matches!(
            registry.finalize(),
            Err(GeneticError::Configuration(_))
        ));
    }

    #[test]
    fn test_pick_before_finalize_rejected() {
        let registry = OperatorRegistry::<TestGenome>::new();
        registry.add(1.0, Arc::new(CloneFirstParent)).unwrap();

        let mut rng = RandomNumberGenerator::from_seed(1);
        assert!(registry.pick(&mut rng).is_err());
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let registry = OperatorRegistry::<TestGenome>::new();
        assert!(registry.add(0.0, Arc::new(CloneFirstParent)).is_err());
        assert!(registry.add(-1.0, Arc::new(CloneFirstParent)).is_err());
        assert!(registry.add(f64::NAN, Arc::new(CloneFirstParent)).is_err());
    }

    #[test]
    fn test_pick_returns_registered_operator() {
        let registry = OperatorRegistry::<TestGenome>::new();
        registry.add(0.3, Arc::new(CloneFirstParent)).unwrap();
        registry.add(0.7, Arc::new(CloneFirstParent)).unwrap();
        registry.finalize().unwrap();

        let mut rng = RandomNumberGenerator::from_seed(1);
        for _ in 0..100 {
            let operator = registry.pick(&mut rng).unwrap();
            assert_eq!(operator.parents_needed(), 1);
        }
    }
}
