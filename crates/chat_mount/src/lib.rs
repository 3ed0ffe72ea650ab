//! chat_mount - connection lifecycle for the embedded chat widget
//!
//! Drives the status indicator through `Idle -> Connecting -> Ready` (or
//! `Unavailable`), fetching a session secret from the proxy and handing it to
//! the widget. Rendering stays behind the [`ChatWidget`] and [`MountSurface`]
//! traits.

pub mod controller;
pub mod error;
pub mod machine;
pub mod options;
pub mod secret_client;
pub mod surface;
pub mod widget;

pub use controller::{LifecycleController, MountOutcome};
pub use error::{MountError, WidgetError, SERVICE_UNAVAILABLE_MESSAGE};
pub use machine::{ConnectionStatus, MountEvent, StateMachine, StateTransition, TransitionError};
pub use options::{ApiOptions, ClientSecretProvider, Presentation, WidgetOptions};
pub use secret_client::{SecretSource, SessionClient};
pub use surface::{MountSurface, CONNECTING_TEXT, UNAVAILABLE_TEXT};
pub use widget::{ChatWidget, ReadyCallback};
