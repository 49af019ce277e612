//! Error types for edaf
//!
//! This module defines all error types used throughout the library.
//! Configuration and model-state failures are errors; numerical edge cases
//! inside the models (zero joint counts, zero variance, zero weights) are
//! handled where they occur and never reach these types.

use thiserror::Error;

/// Error type for genome operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenomeError {
    /// Invalid genome structure
    #[error("Invalid genome structure: {0}")]
    InvalidStructure(String),

    /// Constraint violation in genome
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Error type for probabilistic model failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// `sample` was called before any successful `fit`
    #[error("Model '{model}' has not been fitted")]
    NotFitted { model: &'static str },

    /// `fit` was called with zero selected individuals
    #[error("Model '{model}' cannot be fitted on an empty selection")]
    EmptySelection { model: &'static str },

    /// Selected genotypes disagree on length
    #[error("Genotype length mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A sampled genotype could not be constructed
    #[error("Genome construction failed: {0}")]
    Genome(#[from] GenomeError),
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Genome error
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Model error
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Fitness evaluation failed
    #[error("Fitness evaluation failed: {0}")]
    FitnessEvaluation(String),

    /// The evaluation pool was interrupted; partial results were discarded
    #[error("Evaluation aborted: {0}")]
    EvaluationAborted(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Numerical instability
    #[error("Numerical instability: {0}")]
    Numerical(String),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;
