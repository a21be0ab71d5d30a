//! `RecordingListener` — a test double for `TransitionListener`.
//!
//! Subscribe one to any number of transitions and inspect the events they
//! emitted afterwards.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{State, TransitionEvent, TransitionListener};

/// A listener that stores every event it receives, in arrival order.
///
/// Clones share the same event log.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<TransitionEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events seen so far.
    pub fn events(&self) -> Vec<TransitionEvent> {
        self.log().clone()
    }

    /// States entered so far, in order.
    pub fn entered(&self) -> Vec<State> {
        self.log()
            .iter()
            .filter_map(|event| match event {
                TransitionEvent::Entered(state) => Some(state.clone()),
                TransitionEvent::Exited(_) => None,
            })
            .collect()
    }

    /// Number of events received.
    pub fn count(&self) -> usize {
        self.log().len()
    }

    fn log(&self) -> MutexGuard<'_, Vec<TransitionEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TransitionListener for RecordingListener {
    fn notify(&self, event: &TransitionEvent) {
        self.log().push(event.clone());
    }
}
