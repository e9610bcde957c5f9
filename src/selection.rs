//! # Selection
//!
//! Two pluggable seams live here. [`GenomeComparator`] supplies the strict
//! "better than" ordering used for best-genome tracking — whether lower or
//! higher adjusted scores win is the comparator's responsibility, never
//! assumed by the coordinator. [`SelectionStrategy`] picks population slots:
//! `select` finds a good performer to use as a parent, `anti_select` finds a
//! poor performer to overwrite.
//!
//! [`TournamentSelection`] is the default strategy, matching the original
//! trainer's 4-round tournament.

use std::fmt::Debug;

use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::Population;
use crate::rng::RandomNumberGenerator;

/// A strict "better than" ordering over two genomes' adjusted scores.
pub trait GenomeComparator<G: Genome>: Debug + Send + Sync {
    /// Returns true if `a` is strictly better than `b`.
    fn is_better(&self, a: &G, b: &G) -> bool;
}

/// Compares genomes by adjusted score, in a configurable direction.
///
/// # Examples
///
/// ```
/// use genetrain::selection::AdjustedScoreComparator;
///
/// // An error-style score where smaller is better:
/// let comparator = AdjustedScoreComparator::minimizing();
/// // A reward-style score where bigger is better:
/// let comparator = AdjustedScoreComparator::maximizing();
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct AdjustedScoreComparator {
    minimize: bool,
}

impl AdjustedScoreComparator {
    /// A comparator where lower adjusted scores are better.
    pub fn minimizing() -> Self {
        Self { minimize: true }
    }

    /// A comparator where higher adjusted scores are better.
    pub fn maximizing() -> Self {
        Self { minimize: false }
    }
}

impl<G: Genome> GenomeComparator<G> for AdjustedScoreComparator {
    fn is_better(&self, a: &G, b: &G) -> bool {
        if self.minimize {
            a.adjusted_score() < b.adjusted_score()
        } else {
            a.adjusted_score() > b.adjusted_score()
        }
    }
}

/// Picks population slots for parenting and for replacement.
///
/// Strategies operate on slot indices rather than genome references because
/// the population lives behind the coordinator's lock; the caller resolves
/// the index while still holding it.
pub trait SelectionStrategy<G: Genome>: Debug + Send + Sync {
    /// Picks a well-performing member to use as a parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the population is empty.
    fn select(
        &self,
        population: &Population<G>,
        comparator: &dyn GenomeComparator<G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize>;

    /// Picks a poorly-performing member to be overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the population is empty.
    fn anti_select(
        &self,
        population: &Population<G>,
        comparator: &dyn GenomeComparator<G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize>;
}

/// Tournament selection over population slots.
///
/// Runs `rounds` comparisons against randomly drawn members, keeping the
/// winner (for `select`) or the loser (for `anti_select`). More rounds mean
/// stronger selection pressure.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TournamentSelection {
    rounds: usize,
}

impl TournamentSelection {
    /// Creates a tournament with the given number of rounds.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `rounds` is zero.
    pub fn new(rounds: usize) -> Result<Self> {
        if rounds == 0 {
            return Err(GeneticError::Configuration(
                "Tournament rounds must be at least 1".to_string(),
            ));
        }
        Ok(Self { rounds })
    }

    fn run<G: Genome>(
        &self,
        population: &Population<G>,
        rng: &mut RandomNumberGenerator,
        keep: impl Fn(&G, &G) -> bool,
    ) -> Result<usize> {
        if population.size() == 0 {
            return Err(GeneticError::EmptyPopulation);
        }

        let mut held = rng.gen_range(0..population.size());
        for _ in 0..self.rounds {
            let challenger = rng.gen_range(0..population.size());
            if keep(population.get(challenger), population.get(held)) {
                held = challenger;
            }
        }
        Ok(held)
    }
}

impl Default for TournamentSelection {
    /// A 4-round tournament.
    fn default() -> Self {
        Self { rounds: 4 }
    }
}

impl<G: Genome> SelectionStrategy<G> for TournamentSelection {
    fn select(
        &self,
        population: &Population<G>,
        comparator: &dyn GenomeComparator<G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        self.run(population, rng, |challenger, held| {
            comparator.is_better(challenger, held)
        })
    }

    fn anti_select(
        &self,
        population: &Population<G>,
        comparator: &dyn GenomeComparator<G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        self.run(population, rng, |challenger, held| {
            comparator.is_better(held, challenger)
        })
    }
}
