//! Status state machine for one widget mount.

mod events;
mod states;
mod transitions;

pub use events::MountEvent;
pub use states::ConnectionStatus;
pub use transitions::{StateMachine, StateTransition, TransitionError};
