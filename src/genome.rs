//! # Genome Trait
//!
//! The `Genome` trait defines the interface for candidate solutions managed
//! by the trainer. The coordinator treats a genome's encoded content as
//! opaque: all it needs is the raw fitness score, the adjusted score written
//! back after the complexity penalty, a size metric, and the ability to
//! deep-overwrite one genome from another so population slots can be
//! recycled in place.
//!
//! ## Example
//!
//! ```rust
//! use genetrain::genome::Genome;
//!
//! #[derive(Clone, Debug)]
//! struct MyGenome {
//!     genes: Vec<f64>,
//!     score: f64,
//!     adjusted_score: f64,
//! }
//!
//! impl Genome for MyGenome {
//!     fn score(&self) -> f64 {
//!         self.score
//!     }
//!
//!     fn set_score(&mut self, score: f64) {
//!         self.score = score;
//!     }
//!
//!     fn adjusted_score(&self) -> f64 {
//!         self.adjusted_score
//!     }
//!
//!     fn set_adjusted_score(&mut self, score: f64) {
//!         self.adjusted_score = score;
//!     }
//!
//!     fn size(&self) -> usize {
//!         self.genes.len()
//!     }
//!
//!     fn copy_from(&mut self, other: &Self) {
//!         self.genes.clone_from(&other.genes);
//!         self.score = other.score;
//!         self.adjusted_score = other.adjusted_score;
//!     }
//! }
//! ```

use std::fmt::Debug;

use crate::rng::RandomNumberGenerator;

/// Trait for candidate solutions in the search population.
///
/// Types implementing this trait must also implement `Clone`, `Debug`,
/// `Send`, and `Sync` so genomes can cross thread boundaries and be copied
/// into the coordinator's best-genome slot.
pub trait Genome: Clone + Debug + Send + Sync {
    /// Returns the raw fitness score.
    ///
    /// Written by the scoring collaborator, never by the coordinator.
    fn score(&self) -> f64;

    /// Sets the raw fitness score.
    fn set_score(&mut self, score: f64);

    /// Returns the fitness score after the complexity penalty.
    fn adjusted_score(&self) -> f64;

    /// Sets the adjusted score.
    ///
    /// Only the coordinator writes this field, while holding its lock.
    fn set_adjusted_score(&mut self, score: f64);

    /// Returns the genome's complexity metric.
    ///
    /// Compared against the population's maximum individual size on every
    /// insertion and fed to the complexity penalty.
    fn size(&self) -> usize;

    /// Deep-overwrites this genome's content from another genome.
    ///
    /// Population slots are never destroyed; they are recycled by copying
    /// new candidates over anti-selected victims.
    fn copy_from(&mut self, other: &Self);
}

/// Factory for creating genomes.
///
/// The population uses this to fill its slots at startup, and the trainer
/// uses it to allocate the best-genome slot and scratch genomes.
pub trait GenomeFactory<G: Genome>: Send + Sync {
    /// Creates a new, blank genome.
    fn factor(&self) -> G;

    /// Creates a new random genome up to the given structural depth.
    fn factor_random(&self, rng: &mut RandomNumberGenerator, max_depth: usize) -> G;
}
