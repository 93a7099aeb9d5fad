//! Transition-table state machine shared by both nodes.
//!
//! A node's states implement [`MachineState`], whose [`next`](MachineState::next)
//! method *is* the transition table: current state × event → next state ×
//! optional action. [`StateMachine`] applies events against that table,
//! rejects anything the table does not list, and keeps a bounded history for
//! diagnostics.
//!
//! # Examples
//!
//! ```
//! use latchkey_node::StateMachine;
//! use latchkey_node::authority::{DoorEvent, DoorPhase};
//!
//! let mut door = StateMachine::new(DoorPhase::Idle);
//! door.fire(DoorEvent::UnlockRequested).unwrap();
//! assert_eq!(door.current_state(), DoorPhase::Unlocking);
//!
//! // Not in the table.
//! assert!(door.fire(DoorEvent::MotionCleared).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use latchkey_core::{Error, Result};

/// Maximum number of state transitions to keep in history.
const MAX_HISTORY_SIZE: usize = 100;

/// A state whose transitions are given by a table.
pub trait MachineState: Copy + Eq + fmt::Debug + fmt::Display {
    /// Inputs that drive the machine.
    type Event: Copy + fmt::Debug;

    /// Side effect a transition asks the caller to perform.
    type Action: Copy + fmt::Debug + Eq;

    /// Look up `event` in the transition table.
    ///
    /// Returns `None` when the event is not accepted in this state.
    fn next(self, event: Self::Event) -> Option<(Self, Option<Self::Action>)>;
}

/// A single recorded state transition.
#[derive(Debug, Clone, Copy)]
pub struct StateTransition<S: MachineState> {
    pub from: S,
    pub to: S,
    pub event: S::Event,
    pub action: Option<S::Action>,
    pub timestamp: Instant,
}

impl<S: MachineState> StateTransition<S> {
    /// Time since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// Table-driven state machine with bounded history.
#[derive(Debug)]
pub struct StateMachine<S: MachineState> {
    current_state: S,
    state_entered_at: Instant,
    history: VecDeque<StateTransition<S>>,
}

impl<S: MachineState> StateMachine<S> {
    /// Create a machine in `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            current_state: initial,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Time spent in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition<S>> {
        &self.history
    }

    /// The last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition<S>> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).copied().collect()
    }

    /// Apply `event` and return the recorded transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the table has no entry for
    /// `event` in the current state. The machine is left unchanged.
    pub fn fire(&mut self, event: S::Event) -> Result<StateTransition<S>> {
        let Some((to, action)) = self.current_state.next(event) else {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: format!("{event:?}"),
            });
        };

        let transition = StateTransition {
            from: self.current_state,
            to,
            event,
            action,
            timestamp: Instant::now(),
        };
        self.current_state = to;
        self.state_entered_at = transition.timestamp;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(transition)
    }
}
