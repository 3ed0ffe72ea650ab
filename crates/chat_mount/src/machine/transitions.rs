use thiserror::Error;

use super::events::MountEvent;
use super::states::ConnectionStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} with event {event:?}")]
    InvalidTransition {
        from: ConnectionStatus,
        event: MountEvent,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ConnectionStatus,
    pub to: ConnectionStatus,
    pub event: MountEvent,
    pub changed: bool,
}

/// Guards the mount lifecycle. Rejected events leave the state untouched.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    current: ConnectionStatus,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionStatus {
        self.current
    }

    pub fn handle_event(&mut self, event: MountEvent) -> Result<StateTransition, TransitionError> {
        let from = self.current;
        let to = Self::next_state(from, event)
            .ok_or(TransitionError::InvalidTransition { from, event })?;
        self.current = to;

        Ok(StateTransition {
            from,
            to,
            event,
            changed: from != to,
        })
    }

    fn next_state(state: ConnectionStatus, event: MountEvent) -> Option<ConnectionStatus> {
        use ConnectionStatus::*;
        use MountEvent::*;

        match (state, event) {
            (Idle, MountRequested) => Some(Connecting),
            (Connecting, WidgetReady) => Some(Ready),
            (Connecting, MountFailed) => Some(Unavailable),
            (_, Closed) => Some(Idle),
            _ => None,
        }
    }
}
