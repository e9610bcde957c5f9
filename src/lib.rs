pub mod error;
pub mod genome;
pub mod operators;
pub mod population;
pub mod rng;
pub mod selection;
pub mod selector;
pub mod trainer;

// Re-export commonly used types for convenience
pub use error::{GeneticError, Result, ResultExt};
pub use trainer::{Challenge, ComplexityPenalty, GeneticTrainer, TrainerOptions};
