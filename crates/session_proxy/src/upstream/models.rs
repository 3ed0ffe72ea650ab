//! Wire types for the upstream ChatKit sessions endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub user: &'a str,
    pub workflow: WorkflowRef<'a>,
}

#[derive(Debug, Serialize)]
pub struct WorkflowRef<'a> {
    pub id: &'a str,
}

/// The subset of the upstream session object the proxy reads.
///
/// Every other upstream field is dropped during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSession {
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Passed through untouched, whatever its JSON type.
    #[serde(default)]
    pub expires_at: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorEnvelope {
    #[serde(default)]
    pub error: UpstreamErrorObject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpstreamErrorObject {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UpstreamErrorObject {
    /// Lenient parse: anything that is not the expected envelope yields an empty object.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice::<UpstreamErrorEnvelope>(body)
            .map(|envelope| envelope.error)
            .unwrap_or_default()
    }

    /// `code`, then `type`; empty strings count as missing.
    pub fn effective_code(&self) -> Option<&str> {
        self.code
            .as_deref()
            .filter(|code| !code.is_empty())
            .or_else(|| self.error_type.as_deref().filter(|kind| !kind.is_empty()))
    }

    pub fn effective_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|message| !message.is_empty())
    }
}
