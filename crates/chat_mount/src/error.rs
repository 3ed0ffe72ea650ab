use thiserror::Error;

/// The one message end users ever see for a failed session fetch.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str = "Service unavailable. Please try again later.";

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("widget definition unavailable: {0}")]
    Definition(String),

    #[error("widget rejected options: {0}")]
    Configure(String),
}

#[derive(Debug, Error)]
pub enum MountError {
    /// Session fetch failed. `code` is the server's error code, for logs only.
    #[error("{}", SERVICE_UNAVAILABLE_MESSAGE)]
    ServiceUnavailable { code: Option<String> },

    #[error("Chat widget failed: {0}")]
    Widget(#[from] WidgetError),
}

impl MountError {
    pub fn service_unavailable() -> Self {
        Self::ServiceUnavailable { code: None }
    }

    /// Short annotation for the unavailable message. Server codes never appear here.
    pub fn note(&self) -> Option<&'static str> {
        match self {
            Self::ServiceUnavailable { .. } => None,
            Self::Widget(_) => Some("widget unavailable"),
        }
    }

    pub fn diagnostic_code(&self) -> Option<&str> {
        match self {
            Self::ServiceUnavailable { code } => code.as_deref(),
            Self::Widget(_) => None,
        }
    }
}
