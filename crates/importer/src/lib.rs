//! `importer` crate — builds a workflow graph from a process-diagram document.
//!
//! The accepted dialect is a small subset of process-diagram XML:
//!
//! - `startEvent` becomes an entry state, `endEvent` an exit state;
//! - task-like nodes (`task`, `userTask`, `serviceTask`, ...) and the
//!   exclusive/inclusive gateways become plain states;
//! - every `sequenceFlow` becomes a transition from its `sourceRef` to its
//!   `targetRef`, in document order.
//!
//! Labels come from the `name` attribute and fall back to the element id.
//! Fork and barrier states cannot be expressed in this subset; build those
//! programmatically with [`model::State::fork`] and [`model::State::barrier`].
//!
//! Ids are derived from the element ids, so importing the same document twice
//! yields states and transitions with identical ids.

pub mod error;
mod parse;

use model::{State, Transition};
use tracing::info;

pub use error::ParseError;

/// Everything read from a diagram document.
#[derive(Debug, Clone)]
pub struct Diagram {
    /// Imported states, in document order.
    pub states: Vec<State>,
    /// Imported transitions, in document order.
    pub transitions: Vec<Transition>,
}

/// Import a diagram, keeping the full state list.
///
/// # Errors
/// [`ParseError`] if the document is not well-formed, if a sequence flow lacks
/// `sourceRef`/`targetRef` or points at an unknown node, or if an id repeats.
pub fn import_diagram(document: &str) -> Result<Diagram, ParseError> {
    let diagram = parse::parse(document)?;
    info!(
        "imported diagram with {} states and {} transitions",
        diagram.states.len(),
        diagram.transitions.len()
    );
    Ok(diagram)
}

/// Import a diagram and return its transitions in document order.
///
/// # Errors
/// See [`import_diagram`].
pub fn import_str(document: &str) -> Result<Vec<Transition>, ParseError> {
    import_diagram(document).map(|diagram| diagram.transitions)
}
