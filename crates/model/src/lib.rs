//! `model` crate — states, transitions, and the transition event channel.
//!
//! A workflow graph is nothing more than a list of [`Transition`]s; the
//! [`State`]s it contains are reached through each transition's source and
//! destination. Both crates that consume a graph (the importer that builds one
//! and the engine that runs one) depend on this crate only.

pub mod error;
pub mod events;
pub mod recorder;
pub mod state;
pub mod transition;

pub use error::ModelError;
pub use events::{TransitionEvent, TransitionListener};
pub use state::{State, StateId, StateKind};
pub use transition::{Firing, Guard, Transition, TransitionId};
