//! The transition event channel.
//!
//! Every transition carries its own observer list. When a transition fires it
//! notifies each listener synchronously, first with the exit of its source
//! state and then with the entry of its destination.

use crate::State;

/// A notification emitted by a firing transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    /// The source state was left.
    Exited(State),
    /// The destination state was entered.
    Entered(State),
}

impl TransitionEvent {
    /// The state the event is about.
    pub fn state(&self) -> &State {
        match self {
            TransitionEvent::Exited(state) | TransitionEvent::Entered(state) => state,
        }
    }
}

/// Observer attached to a transition.
pub trait TransitionListener: Send + Sync {
    fn notify(&self, event: &TransitionEvent);
}

impl<F> TransitionListener for F
where
    F: Fn(&TransitionEvent) + Send + Sync,
{
    fn notify(&self, event: &TransitionEvent) {
        self(event)
    }
}
