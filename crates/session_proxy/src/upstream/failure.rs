use thiserror::Error;

use super::models::UpstreamErrorObject;

/// Everything that can go wrong on one upstream attempt.
///
/// The transport layer produces exactly one of these; normalization consumes
/// them exhaustively.
#[derive(Debug, Clone, Error)]
pub enum UpstreamFailure {
    /// Upstream answered with a non-success status.
    #[error("upstream rejected the request with HTTP {status}")]
    UpstreamRejected {
        status: u16,
        /// Raw `retry-after` header value, if present.
        retry_after: Option<String>,
        error: UpstreamErrorObject,
    },

    /// The request left the process but no complete response came back.
    #[error("no response from upstream: {reason}")]
    UpstreamUnreachable { reason: String },

    /// The call could not be built, sent, or its result decoded locally.
    #[error("{message}")]
    LocalDispatchFailure { message: String },
}

impl UpstreamFailure {
    /// Nothing was dispatched when reqwest fails while building the request.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::LocalDispatchFailure {
                message: err.to_string(),
            }
        } else {
            Self::UpstreamUnreachable {
                reason: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for UpstreamFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::LocalDispatchFailure {
            message: format!("Failed to decode upstream session: {}", err),
        }
    }
}
