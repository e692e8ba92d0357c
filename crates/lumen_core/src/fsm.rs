//! State Machine Runtime
//!
//! Small flat state machines keyed by caller-defined state and event types:
//! a `(state, event) -> state` table plus entry actions run whenever a state
//! is entered.

use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::Hash;

/// An action run when a state is entered
pub type Action = Box<dyn FnMut()>;

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    transitions: FxHashMap<(S, E), S>,
    entry_callbacks: FxHashMap<S, Vec<Action>>,
}

impl<S, E> StateMachineBuilder<S, E>
where
    S: Copy + Eq + Hash + fmt::Debug,
    E: Copy + Eq + Hash + fmt::Debug,
{
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: FxHashMap::default(),
            entry_callbacks: FxHashMap::default(),
        }
    }

    /// Add a transition (from, event, to); a later entry for the same
    /// `(from, event)` replaces the earlier one
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.insert((from, event), to);
        self
    }

    /// Add an entry action for a state
    pub fn on_enter<F: FnMut() + 'static>(mut self, state: S, action: F) -> Self {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine<S, E> {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
            entry_callbacks: self.entry_callbacks,
        }
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: FxHashMap<(S, E), S>,
    entry_callbacks: FxHashMap<S, Vec<Action>>,
}

impl<S, E> StateMachine<S, E>
where
    S: Copy + Eq + Hash + fmt::Debug,
    E: Copy + Eq + Hash + fmt::Debug,
{
    /// Create a builder for a state machine
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Send an event to the state machine, potentially triggering a transition
    ///
    /// Events with no matching transition leave the state unchanged. Entry
    /// actions run on every transition into a state, self-transitions included.
    pub fn send(&mut self, event: E) -> S {
        let current = self.current_state;

        let Some(&to_state) = self.transitions.get(&(current, event)) else {
            tracing::trace!(?current, ?event, "fsm: event ignored");
            return current;
        };

        self.current_state = to_state;
        tracing::trace!(from = ?current, ?event, to = ?to_state, "fsm: transition");

        if let Some(callbacks) = self.entry_callbacks.get_mut(&to_state) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        to_state
    }
}

impl<S: fmt::Debug, E> fmt::Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current_state", &self.current_state)
            .field("transitions", &self.transitions.len())
            .finish_non_exhaustive()
    }
}
