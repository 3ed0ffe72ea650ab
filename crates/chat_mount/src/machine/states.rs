use serde::{Deserialize, Serialize};

/// Visible connection status of the chat panel.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Nothing mounted, or the panel was closed.
    #[default]
    Idle,
    /// Waiting on the widget definition, the session secret, or the widget's ready signal.
    Connecting,
    /// Widget initialized; status indicator hidden.
    Ready,
    /// Mount failed; the unavailable message is shown.
    Unavailable,
}
