//! # Population
//!
//! A fixed-capacity, indexable collection of genomes. The population is
//! created once at startup, either from a supplied seed set or by filling
//! every slot from a [`GenomeFactory`], and its length never changes for the
//! duration of a run: candidates replace existing members in place, they are
//! never appended.
//!
//! The population also carries the `max_individual_size` limit enforced on
//! every inserted genome and an optional [`GenomeRewriter`] hook that lets a
//! collaborator normalize a candidate (e.g. simplify it) before it overwrites
//! a slot.

use crate::error::{GeneticError, Result};
use crate::genome::{Genome, GenomeFactory};

/// Hook for normalizing a genome before it replaces a population slot.
///
/// Implementations typically canonicalize or simplify the candidate's
/// encoding. The hook runs inside the coordinator's critical section, so it
/// must not block on other coordination primitives.
pub trait GenomeRewriter<G: Genome>: Send + Sync {
    /// Rewrites the genome in place.
    fn rewrite(&self, genome: &mut G);
}

/// A fixed-capacity collection of genomes under active search.
pub struct Population<G: Genome> {
    genomes: Vec<G>,
    max_individual_size: usize,
    rewriter: Option<Box<dyn GenomeRewriter<G>>>,
}

impl<G: Genome> Population<G> {
    /// Creates a population from an existing set of genomes.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::EmptyPopulation` if `genomes` is empty, and a
    /// configuration error if `max_individual_size` is zero.
    pub fn new(genomes: Vec<G>, max_individual_size: usize) -> Result<Self> {
        if genomes.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        if max_individual_size == 0 {
            return Err(GeneticError::Configuration(
                "Maximum individual size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            genomes,
            max_individual_size,
            rewriter: None,
        })
    }

    /// Creates a population of `size` blank genomes produced by the factory.
    ///
    /// The slots are placeholders until
    /// [`create_random_population`](crate::trainer::GeneticTrainer::create_random_population)
    /// or a manual seeding pass fills them with scored individuals.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `size` or `max_individual_size` is zero.
    pub fn with_capacity<F>(factory: &F, size: usize, max_individual_size: usize) -> Result<Self>
    where
        F: GenomeFactory<G>,
    {
        if size == 0 {
            return Err(GeneticError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }

        let genomes = (0..size).map(|_| factory.factor()).collect();
        Self::new(genomes, max_individual_size)
    }

    /// Installs a rewrite hook applied to every candidate before insertion.
    pub fn set_rewriter(&mut self, rewriter: Box<dyn GenomeRewriter<G>>) {
        self.rewriter = Some(rewriter);
    }

    /// Applies the rewrite hook to a candidate, if one is installed.
    pub fn rewrite(&self, genome: &mut G) {
        if let Some(rewriter) = &self.rewriter {
            rewriter.rewrite(genome);
        }
    }

    /// Returns the number of genomes. Constant for the lifetime of a run.
    pub fn size(&self) -> usize {
        self.genomes.len()
    }

    /// Returns the maximum size metric a member genome may have.
    pub fn max_individual_size(&self) -> usize {
        self.max_individual_size
    }

    /// Returns the genome at `index`.
    pub fn get(&self, index: usize) -> &G {
        &self.genomes[index]
    }

    /// Returns the genome at `index` mutably.
    pub fn get_mut(&mut self, index: usize) -> &mut G {
        &mut self.genomes[index]
    }

    /// Iterates over all members.
    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.genomes.iter()
    }

    /// Iterates mutably over all members.
    pub fn genomes_mut(&mut self) -> impl Iterator<Item = &mut G> {
        self.genomes.iter_mut()
    }

    /// Returns the members as a slice.
    pub fn as_slice(&self) -> &[G] {
        &self.genomes
    }

    /// Returns the members as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [G] {
        &mut self.genomes
    }
}

impl<G: Genome> std::fmt::Debug for Population<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Population")
            .field("size", &self.genomes.len())
            .field("max_individual_size", &self.max_individual_size)
            .field("has_rewriter", &self.rewriter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct TestGenome {
        value: f64,
        score: f64,
        adjusted: f64,
    }

    impl TestGenome {
        fn new(value: f64) -> Self {
            Self {
                value,
                score: 0.0,
                adjusted: 0.0,
            }
        }
    }

    impl Genome for TestGenome {
        fn score(&self) -> f64 {
            self.score
        }

        fn set_score(&mut self, score: f64) {
            self.score = score;
        }

        fn adjusted_score(&self) -> f64 {
            self.adjusted
        }

        fn set_adjusted_score(&mut self, score: f64) {
            self.adjusted = score;
        }

        fn size(&self) -> usize {
            1
        }

        fn copy_from(&mut self, other: &Self) {
            *self = other.clone();
        }
    }

    struct Doubler;

    impl GenomeRewriter<TestGenome> for Doubler {
        fn rewrite(&self, genome: &mut TestGenome) {
            genome.value *= 2.0;
        }
    }

    struct BlankFactory;

    impl GenomeFactory<TestGenome> for BlankFactory {
        fn factor(&self) -> TestGenome {
            TestGenome::new(0.0)
        }

        fn factor_random(
            &self,
            _rng: &mut crate::rng::RandomNumberGenerator,
            _max_depth: usize,
        ) -> TestGenome {
            TestGenome::new(1.0)
        }
    }

    #[test]
    fn test_with_capacity_fills_slots() {
        let population = Population::with_capacity(&BlankFactory, 8, 10).unwrap();
        assert_eq!(population.size(), 8);
        assert!(population.genomes().all(|g| g.value == 0.0));
    }

    #[test]
    fn test_with_capacity_zero_size_rejected() {
        let result = Population::<TestGenome>::with_capacity(&BlankFactory, 0, 10);
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_empty_population_rejected() {
        let result = Population::<TestGenome>::new(vec![], 10);
        assert!(matches!(result, Err(GeneticError::EmptyPopulation)));
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let result = Population::new(vec![TestGenome::new(1.0)], 0);
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_rewrite_without_hook_is_noop() {
        let population = Population::new(vec![TestGenome::new(1.0)], 10).unwrap();
        let mut candidate = TestGenome::new(3.0);
        population.rewrite(&mut candidate);
        assert_eq!(candidate.value, 3.0);
    }

    #[test]
    fn test_rewrite_hook_applied() {
        let mut population = Population::new(vec![TestGenome::new(1.0)], 10).unwrap();
        population.set_rewriter(Box::new(Doubler));

        let mut candidate = TestGenome::new(3.0);
        population.rewrite(&mut candidate);
        assert_eq!(candidate.value, 6.0);
    }
}
