//! Transitions — directed, guarded edges between two states.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{State, TransitionEvent, TransitionListener};

// ---------------------------------------------------------------------------
// TransitionId
// ---------------------------------------------------------------------------

/// Stable identifier of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(Uuid);

impl TransitionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive an id from an external key; see [`crate::StateId::from_key`].
    pub fn from_key(key: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("transition:{key}").as_bytes()))
    }

    /// Derive an id for an element that has no id of its own.
    ///
    /// Keys live in a separate space from [`TransitionId::from_key`], so a
    /// synthesized key can never collide with an explicit element id.
    pub fn from_anonymous_key(key: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("anon-transition:{key}").as_bytes()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransitionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Guard / Firing
// ---------------------------------------------------------------------------

/// Predicate deciding whether a transition may fire. Receives the source state.
pub type Guard = Arc<dyn Fn(&State) -> bool + Send + Sync>;

/// Outcome of [`Transition::fire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Firing {
    /// Guard passed and both notifications were delivered.
    Fired,
    /// Guard failed or an endpoint is missing; nothing was emitted.
    Blocked,
}

impl Firing {
    pub fn is_fired(self) -> bool {
        matches!(self, Firing::Fired)
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// A directed edge from `in_state` to `out_state`.
///
/// Topology is fixed once the transition is handed to an engine; the guard
/// and listeners may still be set up beforehand.
#[derive(Clone)]
pub struct Transition {
    id: TransitionId,
    name: String,
    in_state: Option<State>,
    out_state: Option<State>,
    guard: Guard,
    listeners: Vec<Arc<dyn TransitionListener>>,
}

impl Transition {
    /// A transition with no endpoints yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(TransitionId::new(), name)
    }

    pub fn with_id(id: TransitionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            in_state: None,
            out_state: None,
            guard: Arc::new(|_: &State| true),
            listeners: Vec::new(),
        }
    }

    /// A transition wired from `from` to `to`.
    pub fn between(name: impl Into<String>, from: &State, to: &State) -> Self {
        let mut transition = Self::new(name);
        transition.set_in_state(from.clone());
        transition.set_out_state(to.clone());
        transition
    }

    /// Builder form of [`Transition::set_guard`].
    pub fn with_guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&State) -> bool + Send + Sync + 'static,
    {
        self.set_guard(guard);
        self
    }

    pub fn set_in_state(&mut self, state: State) {
        self.in_state = Some(state);
    }

    pub fn set_out_state(&mut self, state: State) {
        self.out_state = Some(state);
    }

    /// Replace the guard.
    pub fn set_guard<F>(&mut self, guard: F)
    where
        F: Fn(&State) -> bool + Send + Sync + 'static,
    {
        self.guard = Arc::new(guard);
    }

    /// Attach a listener to this transition's exit/entry notifications.
    pub fn subscribe(&mut self, listener: impl TransitionListener + 'static) {
        self.listeners.push(Arc::new(listener));
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn in_state(&self) -> Option<&State> {
        self.in_state.as_ref()
    }

    pub fn out_state(&self) -> Option<&State> {
        self.out_state.as_ref()
    }

    /// Evaluate the guard against `state`.
    pub fn can_transition(&self, state: &State) -> bool {
        (self.guard)(state)
    }

    /// Try to take this transition.
    ///
    /// Evaluates the guard with the source state; if it passes, notifies every
    /// listener of the source's exit and then of the destination's entry.
    /// Never touches any workflow record, that is the engine's job.
    pub fn fire(&self) -> Firing {
        let (Some(from), Some(to)) = (&self.in_state, &self.out_state) else {
            debug!("transition '{}' has a missing endpoint", self.name);
            return Firing::Blocked;
        };

        if !self.can_transition(from) {
            debug!("transition '{}' blocked by guard at '{}'", self.name, from.name());
            return Firing::Blocked;
        }

        self.emit(&TransitionEvent::Exited(from.clone()));
        self.emit(&TransitionEvent::Entered(to.clone()));
        debug!("transition '{}' fired: '{}' -> '{}'", self.name, from.name(), to.name());
        Firing::Fired
    }

    fn emit(&self, event: &TransitionEvent) {
        for listener in &self.listeners {
            listener.notify(event);
        }
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("in_state", &self.in_state)
            .field("out_state", &self.out_state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
