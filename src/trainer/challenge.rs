//! # Challenge Trait
//!
//! The scoring collaborator. Implementations compute a raw fitness score for
//! a genome and declare which direction is better; the trainer derives its
//! best-genome comparator from that direction.

use crate::genome::Genome;

/// Scores genomes.
///
/// Once training starts, the same challenge instance is called concurrently
/// from every worker thread, so implementations must be `Send + Sync`.
pub trait Challenge<G: Genome>: Send + Sync {
    /// Computes the raw fitness score of a genome.
    ///
    /// A non-finite result is treated as an unrecoverable failure by the
    /// worker that encountered it.
    fn score(&self, genome: &G) -> f64;

    /// Whether lower scores are better. Defaults to false (maximize).
    fn is_minimizing(&self) -> bool {
        false
    }
}
