//! Engine-level error types.

use thiserror::Error;

/// Invalid or missing setup passed to [`crate::WorkflowEngine::init`].
///
/// `step` never fails; only initialisation can.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The namespace used to locate the record slot is empty.
    #[error("namespace must not be empty")]
    EmptyNamespace,

    /// The engine was built without any transitions.
    #[error("transitions must have at least one entry")]
    NoTransitions,

    /// No workflow object was supplied.
    #[error("workflow object must not be absent")]
    MissingRecord,
}
