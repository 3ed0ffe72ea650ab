//! Process-wide configuration for the session proxy.
//!
//! Built once at startup and shared read-only (behind an `Arc`) by every
//! request handler.

use std::fmt;
use std::time::Duration;

/// Placeholder workflow id used when `WORKFLOW_ID` is not configured.
///
/// Requests made with it reach the upstream provider and fail there.
pub const PLACEHOLDER_WORKFLOW_ID: &str = "wf_xxx_from_agent_builder_publish";

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.openai.com/v1";

/// Ceiling for a single upstream attempt.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct ProxyConfig {
    api_key: String,
    workflow_id: String,
    upstream_base_url: String,
    upstream_timeout: Duration,
}

impl ProxyConfig {
    /// An empty `workflow_id` falls back to [`PLACEHOLDER_WORKFLOW_ID`].
    pub fn new(api_key: impl Into<String>, workflow_id: impl Into<String>) -> Self {
        let workflow_id = workflow_id.into();
        let workflow_id = if workflow_id.trim().is_empty() {
            PLACEHOLDER_WORKFLOW_ID.to_string()
        } else {
            workflow_id
        };

        Self {
            api_key: api_key.into(),
            workflow_id,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_upstream_base_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn upstream_base_url(&self) -> &str {
        &self.upstream_base_url
    }

    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }

    pub fn sessions_url(&self) -> String {
        format!("{}/chatkit/sessions", self.upstream_base_url)
    }

    pub fn uses_placeholder_workflow(&self) -> bool {
        self.workflow_id == PLACEHOLDER_WORKFLOW_ID
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("api_key", &"<redacted>")
            .field("workflow_id", &self.workflow_id)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}
