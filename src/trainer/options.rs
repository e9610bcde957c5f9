//! # TrainerOptions
//!
//! Configuration for the multi-threaded trainer: worker-pool sizing, the
//! tournament pressure used for parent and victim selection, the threshold
//! above which bulk scoring goes parallel, and the complexity-penalty ramp
//! applied to every adjusted score.
//!
//! ## Example
//!
//! ```rust
//! use genetrain::trainer::{ComplexityPenalty, TrainerOptions};
//!
//! let options = TrainerOptions::builder()
//!     .thread_count(4)
//!     .tournament_rounds(6)
//!     .complexity_penalty(ComplexityPenalty::new(10, 20, 0.0, 1.0).unwrap())
//!     .build();
//! ```

use crate::error::{GeneticError, Result};

/// A linear-ramp fitness penalty for oversized genomes.
///
/// Genomes whose size metric is at or below `threshold` keep their raw score.
/// Above it, the penalty fraction grows linearly toward `full_penalty` as the
/// size approaches `full_threshold`, and keeps extrapolating past it. The
/// adjusted score is `raw + raw * fraction`.
///
/// A configuration where `full_threshold <= threshold` would divide by a
/// zero (or negative) range and is rejected at construction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexityPenalty {
    threshold: usize,
    full_threshold: usize,
    penalty: f64,
    full_penalty: f64,
}

impl ComplexityPenalty {
    /// Creates a penalty ramp.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Size at which the penalty starts.
    /// * `full_threshold` - Size at which the penalty reaches `full_penalty`.
    /// * `penalty` - Penalty fraction at the start of the ramp.
    /// * `full_penalty` - Penalty fraction at `full_threshold`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `full_threshold <= threshold` or if
    /// either penalty fraction is not finite.
    pub fn new(
        threshold: usize,
        full_threshold: usize,
        penalty: f64,
        full_penalty: f64,
    ) -> Result<Self> {
        if full_threshold <= threshold {
            return Err(GeneticError::Configuration(format!(
                "Complexity penalty full threshold ({}) must be greater than the threshold ({})",
                full_threshold, threshold
            )));
        }
        if !penalty.is_finite() || !full_penalty.is_finite() {
            return Err(GeneticError::Configuration(
                "Complexity penalty fractions must be finite".to_string(),
            ));
        }

        Ok(Self {
            threshold,
            full_threshold,
            penalty,
            full_penalty,
        })
    }

    /// Size at which the penalty starts.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Size at which the penalty reaches `full_penalty`.
    pub fn full_threshold(&self) -> usize {
        self.full_threshold
    }

    /// Computes the adjusted score for a genome of the given size.
    ///
    /// Deterministic and side-effect free; the caller writes the result into
    /// the genome's adjusted-score field.
    pub fn adjust(&self, raw: f64, size: usize) -> f64 {
        if size <= self.threshold {
            return raw;
        }

        let over = (size - self.threshold) as f64;
        let range = (self.full_threshold - self.threshold) as f64;
        let fraction = ((self.full_penalty - self.penalty) / range) * over;
        raw + raw * fraction
    }
}

impl Default for ComplexityPenalty {
    /// The original trainer's defaults: the penalty ramps from 0.2 at size 10
    /// to 2.0 at size 50.
    fn default() -> Self {
        Self {
            threshold: 10,
            full_threshold: 50,
            penalty: 0.2,
            full_penalty: 2.0,
        }
    }
}

/// Configuration options for a [`GeneticTrainer`](crate::trainer::GeneticTrainer).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TrainerOptions {
    thread_count: usize,
    tournament_rounds: usize,
    parallel_threshold: usize,
    complexity_penalty: ComplexityPenalty,
}

impl TrainerOptions {
    /// Number of worker threads; 0 means use the host's hardware concurrency.
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Sets the number of worker threads (0 = hardware concurrency).
    ///
    /// Takes effect the next time the worker pool is started.
    pub fn set_thread_count(&mut self, thread_count: usize) {
        self.thread_count = thread_count;
    }

    /// Number of rounds in the parent/victim selection tournaments.
    pub fn tournament_rounds(&self) -> usize {
        self.tournament_rounds
    }

    /// Minimum population size at which bulk scoring runs in parallel.
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// The complexity-penalty ramp.
    pub fn complexity_penalty(&self) -> &ComplexityPenalty {
        &self.complexity_penalty
    }

    /// Returns a builder for creating a `TrainerOptions` instance.
    pub fn builder() -> TrainerOptionsBuilder {
        TrainerOptionsBuilder::default()
    }
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self {
            thread_count: 0,
            tournament_rounds: 4,
            parallel_threshold: 1000,
            complexity_penalty: ComplexityPenalty::default(),
        }
    }
}

/// Builder for [`TrainerOptions`].
///
/// Provides a fluent interface for constructing `TrainerOptions` instances.
#[derive(Debug, Clone, Default)]
pub struct TrainerOptionsBuilder {
    thread_count: Option<usize>,
    tournament_rounds: Option<usize>,
    parallel_threshold: Option<usize>,
    complexity_penalty: Option<ComplexityPenalty>,
}

impl TrainerOptionsBuilder {
    /// Sets the number of worker threads (0 = hardware concurrency).
    pub fn thread_count(mut self, value: usize) -> Self {
        self.thread_count = Some(value);
        self
    }

    /// Sets the number of tournament rounds.
    pub fn tournament_rounds(mut self, value: usize) -> Self {
        self.tournament_rounds = Some(value);
        self
    }

    /// Sets the parallel-scoring threshold.
    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    /// Sets the complexity-penalty ramp.
    pub fn complexity_penalty(mut self, value: ComplexityPenalty) -> Self {
        self.complexity_penalty = Some(value);
        self
    }

    /// Builds the `TrainerOptions` instance.
    pub fn build(self) -> TrainerOptions {
        let defaults = TrainerOptions::default();
        TrainerOptions {
            thread_count: self.thread_count.unwrap_or(defaults.thread_count),
            tournament_rounds: self.tournament_rounds.unwrap_or(defaults.tournament_rounds),
            parallel_threshold: self
                .parallel_threshold
                .unwrap_or(defaults.parallel_threshold),
            complexity_penalty: self
                .complexity_penalty
                .unwrap_or(defaults.complexity_penalty),
        }
    }
}
