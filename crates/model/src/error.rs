//! Model-level error type.

use thiserror::Error;

/// Errors raised while constructing graph elements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Fork and barrier states need at least one branch / arrival.
    #[error("state '{state}' has invalid degree {degree}: must be a positive integer")]
    InvalidDegree { state: String, degree: u32 },
}
