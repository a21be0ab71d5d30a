//! State model.
//!
//! A state is identified by its [`StateId`]; the name is only a label.
//! Two `State` values compare equal whenever their ids match, regardless of
//! name or kind, so clones handed out to transitions, records and views all
//! refer to the same graph node.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ModelError;

// ---------------------------------------------------------------------------
// StateId
// ---------------------------------------------------------------------------

/// Stable identifier of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(Uuid);

impl StateId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive an id from an external key (e.g. a diagram element id).
    ///
    /// The same key always yields the same id, which lets a host rebuild a
    /// graph from its source document and keep using previously stored ids.
    pub fn from_key(key: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("state:{key}").as_bytes()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// StateKind
// ---------------------------------------------------------------------------

/// The closed set of state kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateKind {
    /// Starting point of the graph.
    Entry,
    /// Terminal point of the graph.
    Exit,
    /// Ordinary pass-through state.
    Plain,
    /// AND-split: every outgoing transition fires in the same step.
    Fork {
        /// Number of outgoing branches the fork is expected to activate.
        branch_degree: u32,
    },
    /// AND-join: becomes active only after `join_degree` arrivals.
    Barrier {
        /// Number of arrivals required before the barrier is released.
        join_degree: u32,
    },
}

impl StateKind {
    fn validate(&self, state: &str) -> Result<(), ModelError> {
        match *self {
            StateKind::Fork { branch_degree: 0 } | StateKind::Barrier { join_degree: 0 } => {
                Err(ModelError::InvalidDegree {
                    state: state.to_owned(),
                    degree: 0,
                })
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// A named node of the workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawState")]
pub struct State {
    id: StateId,
    name: String,
    kind: StateKind,
}

impl State {
    /// Build a state with an explicit id.
    ///
    /// # Errors
    /// [`ModelError::InvalidDegree`] if a fork or barrier degree is zero.
    pub fn with_id(id: StateId, name: impl Into<String>, kind: StateKind) -> Result<Self, ModelError> {
        let name = name.into();
        kind.validate(&name)?;
        Ok(Self { id, name, kind })
    }

    pub fn entry(name: impl Into<String>) -> Self {
        Self::infallible(name, StateKind::Entry)
    }

    pub fn exit(name: impl Into<String>) -> Self {
        Self::infallible(name, StateKind::Exit)
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self::infallible(name, StateKind::Plain)
    }

    /// An AND-split with `branch_degree` outgoing branches.
    ///
    /// # Errors
    /// [`ModelError::InvalidDegree`] if `branch_degree` is zero.
    pub fn fork(name: impl Into<String>, branch_degree: u32) -> Result<Self, ModelError> {
        Self::with_id(StateId::new(), name, StateKind::Fork { branch_degree })
    }

    /// An AND-join released after `join_degree` arrivals.
    ///
    /// # Errors
    /// [`ModelError::InvalidDegree`] if `join_degree` is zero.
    pub fn barrier(name: impl Into<String>, join_degree: u32) -> Result<Self, ModelError> {
        Self::with_id(StateId::new(), name, StateKind::Barrier { join_degree })
    }

    fn infallible(name: impl Into<String>, kind: StateKind) -> Self {
        Self {
            id: StateId::new(),
            name: name.into(),
            kind,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn is_start(&self) -> bool {
        matches!(self.kind, StateKind::Entry)
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, StateKind::Exit)
    }

    /// Branch degree of a fork or join degree of a barrier.
    pub fn degree(&self) -> Option<u32> {
        match self.kind {
            StateKind::Fork { branch_degree } => Some(branch_degree),
            StateKind::Barrier { join_degree } => Some(join_degree),
            StateKind::Entry | StateKind::Exit | StateKind::Plain => None,
        }
    }
}

/// Unvalidated wire form of a [`State`].
#[derive(Deserialize)]
struct RawState {
    id: StateId,
    name: String,
    kind: StateKind,
}

impl TryFrom<RawState> for State {
    type Error = ModelError;

    fn try_from(raw: RawState) -> Result<Self, Self::Error> {
        State::with_id(raw.id, raw.name, raw.kind)
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
