//! # Error Types
//!
//! This module defines custom error types for the training coordinator.
//! It provides specific error variants for the failure scenarios that may
//! occur while configuring a trainer, while workers are running, and while
//! the worker pool is being torn down.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use genetrain::error::{GeneticError, Result};
//!
//! fn some_function() -> Result<()> {
//!     // Function implementation
//!     Ok(())
//! }
//!
//! fn caller() {
//!     match some_function() {
//!         Ok(_) => println!("Success!"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use genetrain::error::{Result, ResultExt};
//!
//! fn parse_seed(raw: &str) -> Result<u64> {
//!     raw.parse::<u64>().context("Failed to parse RNG seed")
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while coordinating a training run.
///
/// This enum provides specific error variants for the different failure
/// scenarios of the multi-threaded trainer: invalid configuration detected
/// at setup, fatal conditions raised while inserting genomes into the
/// population, errors reported by worker threads, and teardown failures.
#[derive(Error, Debug, Clone)]
pub enum GeneticError {
    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when a candidate genome is too large for the population.
    ///
    /// This is fatal to the `add_genome` call that raised it: the batch stops
    /// at the offending candidate and no rollback of earlier insertions is
    /// attempted.
    #[error("Genome of size {size} is too large to be added to a population with maximum individual size {max}")]
    OversizedGenome {
        /// The size metric of the rejected candidate.
        size: usize,
        /// The population's maximum individual size.
        max: usize,
    },

    /// Error that occurs when a worker thread reports an unrecoverable failure.
    ///
    /// Raised from `iteration()` after a worker has funneled its failure
    /// through the coordinator's error-report surface.
    #[error("Worker error: {0}")]
    Worker(String),

    /// Error that occurs when a fitness calculation produces an unusable value.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// Error that occurs when a selection operation fails.
    #[error("Selection error: {0}")]
    Selection(String),

    /// Error that occurs when the worker pool cannot be shut down cleanly.
    ///
    /// A worker that cannot be joined is a resource leak and is never
    /// silently swallowed.
    #[error("Shutdown error: {0}")]
    Shutdown(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for training-coordinator operations.
///
/// This type is a convenience wrapper around `std::result::Result` with the
/// error type fixed to `GeneticError`.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Result to add context to errors.
///
/// This trait provides a convenient way to add context to errors when
/// converting from another error type to `GeneticError`.
///
/// ## Examples
///
/// ```rust
/// use genetrain::error::ResultExt;
///
/// fn read_thread_count(raw: &str) -> genetrain::error::Result<usize> {
///     raw.parse::<usize>().context("Invalid thread count")
/// }
/// ```
pub trait ResultExt<T, E> {
    /// Adds context to an error.
    ///
    /// This method converts the error to a `GeneticError` with the provided
    /// context prepended to the original error message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| GeneticError::Other(format!("{}: {}", context, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_genome_message() {
        let err = GeneticError::OversizedGenome { size: 42, max: 30 };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn test_context_wraps_source_error() {
        let parsed: std::result::Result<u64, _> = "not-a-number".parse::<u64>();
        let err = parsed.context("Failed to parse seed").unwrap_err();
        assert!(matches!(err, GeneticError::Other(_)));
        assert!(err.to_string().starts_with("Failed to parse seed"));
    }
}
