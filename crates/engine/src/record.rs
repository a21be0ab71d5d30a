//! Caller-owned workflow state.
//!
//! The engine keeps no per-run state of its own. Everything that changes while
//! a workflow runs lives in a [`WorkflowRecord`], stored under a namespace in a
//! [`WorkflowObject`] the host owns and persists however it likes.
//!
//! Records hold ids only. Guards and listeners stay on the in-memory
//! transitions; a reloaded record is re-bound to them by id when it is handed
//! to an engine built from the same graph.

use std::collections::BTreeMap;

use model::{StateId, TransitionId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// WorkflowRecord
// ---------------------------------------------------------------------------

/// Frontier and history of one workflow run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    /// Active states, without duplicates.
    pub(crate) current_states: Vec<StateId>,
    /// One entry per fired transition, in firing order. Append-only.
    pub(crate) handled_states: Vec<TransitionId>,
    /// Arrivals received by barriers that are not yet released.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) pending_arrivals: BTreeMap<StateId, u32>,
}

impl WorkflowRecord {
    pub(crate) fn starting_at(current_states: Vec<StateId>) -> Self {
        Self {
            current_states,
            ..Self::default()
        }
    }

    pub fn current_states(&self) -> &[StateId] {
        &self.current_states
    }

    pub fn handled_states(&self) -> &[TransitionId] {
        &self.handled_states
    }

    /// Arrivals counted so far at `barrier`.
    pub fn pending_arrivals(&self, barrier: StateId) -> u32 {
        self.pending_arrivals.get(&barrier).copied().unwrap_or(0)
    }

    /// True if any barrier holds arrivals it has not released yet.
    pub fn has_pending_arrivals(&self) -> bool {
        !self.pending_arrivals.is_empty()
    }
}

// ---------------------------------------------------------------------------
// WorkflowObject
// ---------------------------------------------------------------------------

/// Host-owned container of records, keyed by namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowObject {
    slots: BTreeMap<String, WorkflowRecord>,
}

impl WorkflowObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, namespace: &str) -> Option<&WorkflowRecord> {
        self.slots.get(namespace)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.slots.contains_key(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Drop a slot, returning its record.
    pub fn remove(&mut self, namespace: &str) -> Option<WorkflowRecord> {
        self.slots.remove(namespace)
    }

    pub(crate) fn record_mut(&mut self, namespace: &str) -> Option<&mut WorkflowRecord> {
        self.slots.get_mut(namespace)
    }

    pub(crate) fn insert(&mut self, namespace: &str, record: WorkflowRecord) {
        self.slots.insert(namespace.to_owned(), record);
    }
}
