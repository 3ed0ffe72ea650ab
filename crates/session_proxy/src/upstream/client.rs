use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;

use crate::config::ProxyConfig;

use super::failure::UpstreamFailure;
use super::models::{CreateSessionRequest, UpstreamErrorObject, UpstreamSession, WorkflowRef};

const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VALUE: &str = "chatkit_beta=v1";

/// Thin client for the upstream session-creation endpoint.
///
/// One call, no retries, bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    config: Arc<ProxyConfig>,
}

impl UpstreamClient {
    pub fn new(config: Arc<ProxyConfig>) -> reqwest::Result<Self> {
        let http = Client::builder()
            .timeout(config.upstream_timeout())
            .build()?;
        Ok(Self { http, config })
    }

    pub async fn create_session(&self, requester: &str) -> Result<UpstreamSession, UpstreamFailure> {
        let url = self.config.sessions_url();
        let body = CreateSessionRequest {
            user: requester,
            workflow: WorkflowRef {
                id: self.config.workflow_id(),
            },
        };

        tracing::debug!(url = %url, requester = %requester, "Dispatching upstream session request");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(BETA_HEADER, BETA_VALUE)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key()))
            .json(&body)
            .send()
            .await
            .map_err(UpstreamFailure::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            // An unreadable error body still leaves us with the status.
            let error = match response.bytes().await {
                Ok(bytes) => UpstreamErrorObject::from_body(&bytes),
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read upstream error body");
                    UpstreamErrorObject::default()
                }
            };
            return Err(UpstreamFailure::UpstreamRejected {
                status: status.as_u16(),
                retry_after,
                error,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(UpstreamFailure::from_transport)?;
        let session = serde_json::from_slice::<UpstreamSession>(&bytes)?;
        Ok(session)
    }
}
