//! Error types for the finite element engine

use thiserror::Error;

/// Main error type for finite element operations
#[derive(Error, Debug)]
pub enum FeaError {
    #[error("Invalid {domain} integration rule: {rule}")]
    InvalidRule { domain: &'static str, rule: i32 },

    #[error("Invalid element: {0}")]
    InvalidElement(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Singular system matrix - model may be insufficiently restrained")]
    SingularSystem,

    #[error("Eigenvalue extraction failed to converge within {iterations} iterations")]
    EigenSolveFailure { iterations: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for finite element operations
pub type FeaResult<T> = Result<T, FeaError>;
