//! Graph index — built once from the transition list when an engine is
//! created.
//!
//! The index gives the step algorithm constant-time answers to:
//! 1. Which state does this id refer to?
//! 2. Which transitions leave this state (in transition-list order)?
//! 3. Which transition does this id refer to?
//! 4. Where does the workflow start?
//!
//! Nothing here rejects a malformed graph; dangling or duplicated structure
//! simply yields a workflow that stalls.

use std::collections::{HashMap, HashSet};

use model::{State, StateId, StateKind, Transition, TransitionId};
use tracing::warn;

/// Every state referenced by `transitions`, deduplicated by id, in first-seen
/// order (source before destination).
pub fn collect_states(transitions: &[Transition]) -> Vec<State> {
    let mut seen: HashSet<StateId> = HashSet::new();
    transitions
        .iter()
        .flat_map(|t| [t.in_state(), t.out_state()])
        .flatten()
        .filter(|state| seen.insert(state.id()))
        .cloned()
        .collect()
}

/// Lookup tables over a fixed transition list.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    states: Vec<State>,
    state_positions: HashMap<StateId, usize>,
    /// state id → indices into the transition list.
    outgoing: HashMap<StateId, Vec<usize>>,
    transition_positions: HashMap<TransitionId, usize>,
    entry: Option<StateId>,
}

impl GraphIndex {
    pub fn build(transitions: &[Transition]) -> Self {
        let states = collect_states(transitions);

        let state_positions: HashMap<StateId, usize> = states
            .iter()
            .enumerate()
            .map(|(pos, state)| (state.id(), pos))
            .collect();

        let mut outgoing: HashMap<StateId, Vec<usize>> = HashMap::new();
        let mut transition_positions = HashMap::with_capacity(transitions.len());
        for (pos, transition) in transitions.iter().enumerate() {
            transition_positions.entry(transition.id()).or_insert(pos);
            if let Some(from) = transition.in_state() {
                outgoing.entry(from.id()).or_default().push(pos);
            }
        }

        // First entry in scan order wins; uniqueness is not enforced.
        let entry = states.iter().find(|s| s.is_start()).map(State::id);

        for state in &states {
            if let StateKind::Fork { branch_degree } = state.kind() {
                let branches = outgoing.get(&state.id()).map_or(0, Vec::len);
                if branches != branch_degree as usize {
                    warn!(
                        "fork '{}' declares {} branches but has {} outgoing transitions",
                        state.name(),
                        branch_degree,
                        branches
                    );
                }
            }
        }

        Self {
            states,
            state_positions,
            outgoing,
            transition_positions,
            entry,
        }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.state_positions.get(&id).map(|&pos| &self.states[pos])
    }

    /// Positions (in the transition list) of the transitions leaving `id`.
    pub fn outgoing(&self, id: StateId) -> &[usize] {
        self.outgoing.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn transition_position(&self, id: TransitionId) -> Option<usize> {
        self.transition_positions.get(&id).copied()
    }

    pub fn entry(&self) -> Option<&State> {
        self.entry.and_then(|id| self.state(id))
    }
}
