use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NormalizedError;
use crate::normalize::normalize;
use crate::upstream::UpstreamClient;

/// Correlation tag used when the requester's address is unknown.
pub const FALLBACK_REQUESTER: &str = "local-demo";

/// One request for a session. Only the requester tag comes from the caller,
/// and it is never used for authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub requester: String,
}

impl SessionRequest {
    pub fn new(requester: Option<String>) -> Self {
        Self {
            requester: requester
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| FALLBACK_REQUESTER.to_string()),
        }
    }
}

/// What the client receives on success. Nothing else from upstream is exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCredential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<serde_json::Value>,
}

#[async_trait]
pub trait SessionIssuer: Send + Sync {
    async fn issue_session(
        &self,
        request: &SessionRequest,
    ) -> Result<SessionCredential, NormalizedError>;
}

/// Issues sessions by calling the upstream provider once per request.
#[derive(Debug, Clone)]
pub struct UpstreamSessionIssuer {
    client: UpstreamClient,
}

impl UpstreamSessionIssuer {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionIssuer for UpstreamSessionIssuer {
    async fn issue_session(
        &self,
        request: &SessionRequest,
    ) -> Result<SessionCredential, NormalizedError> {
        tracing::info!(requester = %request.requester, "Creating ChatKit session for client");

        match self.client.create_session(&request.requester).await {
            Ok(session) => {
                tracing::info!(
                    requester = %request.requester,
                    expires_at = ?session.expires_at,
                    has_secret = session.client_secret.is_some(),
                    "Issued ChatKit session"
                );
                Ok(SessionCredential {
                    client_secret: session.client_secret,
                    expires_at: session.expires_at,
                })
            }
            Err(failure) => {
                tracing::debug!(failure = %failure, "Upstream session request failed");
                let error = normalize(failure);
                tracing::error!(
                    http = error.http,
                    code = %error.code,
                    message = %error.message,
                    requester = %request.requester,
                    "[OpenAI ERROR] {} {} - {}",
                    error.http,
                    error.code,
                    error.message
                );
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_requester_uses_fallback() {
        assert_eq!(SessionRequest::new(None).requester, FALLBACK_REQUESTER);
        assert_eq!(
            SessionRequest::new(Some(String::new())).requester,
            FALLBACK_REQUESTER
        );
        assert_eq!(
            SessionRequest::new(Some("10.0.0.7".into())).requester,
            "10.0.0.7"
        );
    }

    #[test]
    fn credential_serializes_only_present_fields() {
        let full = SessionCredential {
            client_secret: Some("sk_abc".into()),
            expires_at: Some(serde_json::json!(1700000000)),
        };
        assert_eq!(
            serde_json::to_value(&full).unwrap(),
            serde_json::json!({ "client_secret": "sk_abc", "expires_at": 1700000000 })
        );

        let empty = SessionCredential {
            client_secret: None,
            expires_at: None,
        };
        assert_eq!(serde_json::to_value(&empty).unwrap(), serde_json::json!({}));
    }
}
