use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountEvent {
    /// User asked to open the chat.
    MountRequested,
    /// The widget fired its ready signal.
    WidgetReady,
    /// Secret acquisition or widget handoff failed.
    MountFailed,
    /// User closed the panel.
    Closed,
}
