//! Stepwise workflow execution.
//!
//! `WorkflowEngine` owns a fixed transition list and drives records stored in
//! a caller-owned [`WorkflowObject`]:
//! 1. `init` writes a fresh record whose frontier is the entry state.
//! 2. `step` advances the frontier by exactly one layer: every state active at
//!    the start of the call tries its outgoing transitions once; states reached
//!    during the call are only processed by the next call.
//! 3. `is_finished` reports whether only exit states remain.
//!
//! Forks fire all their outgoing transitions together. Barriers count
//! arrivals in the record and join the frontier once `join_degree` of them
//! have arrived, after which the count starts again from zero.

use std::collections::HashSet;

use model::{State, StateId, StateKind, Transition};
use tracing::{debug, info, instrument, warn};

use crate::graph::GraphIndex;
use crate::record::{WorkflowObject, WorkflowRecord};
use crate::ConfigError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "workflow";

/// Settings for an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Key of the record slot inside the workflow object.
    pub namespace: String,
}

impl EngineConfig {
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }
}

// ---------------------------------------------------------------------------
// WorkflowEngine
// ---------------------------------------------------------------------------

/// Runs a workflow graph against caller-owned records.
///
/// The engine itself is immutable once built; one engine may drive any number
/// of workflow objects, as long as calls for a single object are not made
/// concurrently.
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    config: EngineConfig,
    transitions: Vec<Transition>,
    graph: GraphIndex,
}

impl WorkflowEngine {
    /// Create an engine over `transitions`.
    ///
    /// Configuration is validated by [`WorkflowEngine::init`], not here.
    pub fn new(config: EngineConfig, transitions: Vec<Transition>) -> Self {
        let graph = GraphIndex::build(&transitions);
        Self {
            config,
            transitions,
            graph,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// All states of the graph, deduplicated by id.
    pub fn states(&self) -> &[State] {
        self.graph.states()
    }

    /// The state a fresh record starts from.
    pub fn entry_state(&self) -> Option<&State> {
        self.graph.entry()
    }

    /// Write a fresh record into `object` under the configured namespace.
    ///
    /// Any record already stored there is replaced.
    ///
    /// # Errors
    /// Checked in this order:
    /// - [`ConfigError::EmptyNamespace`] if the namespace is empty.
    /// - [`ConfigError::NoTransitions`] if the engine has no transitions.
    /// - [`ConfigError::MissingRecord`] if `object` is `None`.
    #[instrument(skip_all, fields(namespace = %self.config.namespace))]
    pub fn init(&self, object: Option<&mut WorkflowObject>) -> Result<(), ConfigError> {
        if self.config.namespace.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        if self.transitions.is_empty() {
            return Err(ConfigError::NoTransitions);
        }
        let object = object.ok_or(ConfigError::MissingRecord)?;

        let frontier = match self.graph.entry() {
            Some(entry) => {
                info!("workflow initialised at '{}'", entry.name());
                vec![entry.id()]
            }
            None => {
                warn!("no entry state reachable from the transitions; frontier is empty");
                Vec::new()
            }
        };

        object.insert(&self.config.namespace, WorkflowRecord::starting_at(frontier));
        Ok(())
    }

    /// The record this engine reads and writes inside `object`.
    pub fn record<'a>(&self, object: &'a WorkflowObject) -> Option<&'a WorkflowRecord> {
        object.record(&self.config.namespace)
    }

    /// Advance the frontier by one step.
    ///
    /// Never fails: blocked guards, unsatisfied barriers and missing records all
    /// leave the workflow where it is.
    #[instrument(skip_all, fields(namespace = %self.config.namespace))]
    pub fn step(&self, object: &mut WorkflowObject) {
        let Some(record) = object.record_mut(&self.config.namespace) else {
            warn!("no record under this namespace; call init() first");
            return;
        };

        let snapshot = record.current_states.clone();
        let mut next: Vec<StateId> = Vec::with_capacity(snapshot.len());
        let mut fired = 0usize;

        for &state_id in &snapshot {
            let Some(state) = self.graph.state(state_id) else {
                warn!("frontier holds unknown state {state_id}; keeping it");
                next.push(state_id);
                continue;
            };

            match state.kind() {
                StateKind::Exit => next.push(state_id),

                StateKind::Fork { .. } => {
                    // Blocked branches are dropped; the fork never stays active.
                    for transition in self.outgoing(state_id) {
                        if let Some(to) = self.take(transition, record) {
                            fired += 1;
                            self.arrive(to, record, &mut next);
                        }
                    }
                }

                StateKind::Entry | StateKind::Plain | StateKind::Barrier { .. } => {
                    let mut moved = false;
                    for transition in self.outgoing(state_id) {
                        if let Some(to) = self.take(transition, record) {
                            fired += 1;
                            moved = true;
                            self.arrive(to, record, &mut next);
                        }
                    }
                    if !moved {
                        next.push(state_id);
                    }
                }
            }
        }

        if fired == 0 {
            debug!("no transition fired; frontier unchanged");
            return;
        }

        let mut seen: HashSet<StateId> = HashSet::with_capacity(next.len());
        next.retain(|id| seen.insert(*id));
        record.current_states = next;

        debug!(
            "step fired {} transition(s); frontier now has {} state(s)",
            fired,
            record.current_states.len()
        );
        if self.frontier_is_final(record) {
            info!("workflow finished");
        }
    }

    /// True once every state of the frontier is an exit state and no barrier
    /// is still waiting for arrivals.
    pub fn is_finished(&self, object: &WorkflowObject) -> bool {
        self.record(object)
            .is_some_and(|record| self.frontier_is_final(record))
    }

    /// The frontier resolved to states. Ids unknown to this graph are skipped.
    pub fn current_states(&self, object: &WorkflowObject) -> Vec<&State> {
        self.record(object)
            .map(|record| {
                record
                    .current_states
                    .iter()
                    .filter_map(|&id| self.graph.state(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fired transitions in firing order. Ids unknown to this graph are skipped.
    pub fn handled_transitions(&self, object: &WorkflowObject) -> Vec<&Transition> {
        self.record(object)
            .map(|record| {
                record
                    .handled_states
                    .iter()
                    .filter_map(|&id| self.graph.transition_position(id))
                    .map(|pos| &self.transitions[pos])
                    .collect()
            })
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn outgoing(&self, state_id: StateId) -> impl Iterator<Item = &Transition> + '_ {
        self.graph
            .outgoing(state_id)
            .iter()
            .map(|&pos| &self.transitions[pos])
    }

    /// Fire `transition`; on success record it and return its destination.
    fn take<'t>(&self, transition: &'t Transition, record: &mut WorkflowRecord) -> Option<&'t State> {
        if !transition.fire().is_fired() {
            return None;
        }
        record.handled_states.push(transition.id());
        transition.out_state()
    }

    /// Deliver one arrival at `to`. Barriers hold it back until satisfied.
    fn arrive(&self, to: &State, record: &mut WorkflowRecord, next: &mut Vec<StateId>) {
        let StateKind::Barrier { join_degree } = to.kind() else {
            next.push(to.id());
            return;
        };

        let count = record.pending_arrivals.entry(to.id()).or_insert(0);
        *count += 1;
        if *count >= join_degree {
            record.pending_arrivals.remove(&to.id());
            debug!("barrier '{}' released after {} arrival(s)", to.name(), join_degree);
            next.push(to.id());
        } else {
            debug!("barrier '{}' has {}/{} arrival(s)", to.name(), count, join_degree);
        }
    }

    fn frontier_is_final(&self, record: &WorkflowRecord) -> bool {
        !record.current_states.is_empty()
            && !record.has_pending_arrivals()
            && record
                .current_states
                .iter()
                .all(|&id| self.graph.state(id).is_some_and(State::is_end))
    }
}
