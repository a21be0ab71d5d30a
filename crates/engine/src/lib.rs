//! `engine` crate — stepwise execution of workflow graphs.
//!
//! Build a [`WorkflowEngine`] from a list of [`model::Transition`]s (by hand or
//! through the `importer` crate), `init` a [`WorkflowObject`], then call
//! `step` until `is_finished` reports true.

pub mod error;
pub mod executor;
pub mod graph;
pub mod record;
pub mod view;

pub use error::ConfigError;
pub use executor::{EngineConfig, WorkflowEngine, DEFAULT_NAMESPACE};
pub use graph::collect_states;
pub use record::{WorkflowObject, WorkflowRecord};
pub use view::GraphView;
