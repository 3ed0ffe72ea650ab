use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::error::MountError;

/// Where the controller gets a session secret from.
#[async_trait(?Send)]
pub trait SecretSource {
    async fn fetch_client_secret(&self) -> Result<String, MountError>;
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    #[serde(default)]
    client_secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionErrorPayload {
    #[serde(default)]
    error: SessionErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct SessionErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Fetches secrets from the session proxy with a single POST.
#[derive(Debug, Clone)]
pub struct SessionClient {
    http: Client,
    endpoint: String,
}

impl SessionClient {
    /// `base_url` is the proxy origin; the request goes to `{base_url}/session`.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self::with_endpoint(format!("{}/session", base_url.as_ref().trim_end_matches('/')))
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl SecretSource for SessionClient {
    async fn fetch_client_secret(&self) -> Result<String, MountError> {
        debug!("[CK] fetching client_secret from {}", self.endpoint);

        let response = self.http.post(&self.endpoint).send().await.map_err(|e| {
            warn!("[CK] session request failed: {}", e);
            MountError::service_unavailable()
        })?;

        let status = response.status();
        if !status.is_success() {
            // The body is for diagnostics only.
            let code = match response.json::<SessionErrorPayload>().await {
                Ok(payload) => {
                    warn!(
                        "[CK] session error: {} {} {}",
                        status.as_u16(),
                        payload.error.code.as_deref().unwrap_or("-"),
                        payload.error.message.as_deref().unwrap_or("-")
                    );
                    payload.error.code
                }
                Err(_) => {
                    warn!("[CK] session error: {} (unparseable body)", status.as_u16());
                    None
                }
            };
            return Err(MountError::ServiceUnavailable { code });
        }

        let payload = response.json::<SessionPayload>().await.map_err(|e| {
            warn!("[CK] session payload unreadable: {}", e);
            MountError::service_unavailable()
        })?;

        let secret = payload
            .client_secret
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                warn!("[CK] session payload has no client_secret");
                MountError::service_unavailable()
            })?;

        info!("[CK] got client_secret ok");
        Ok(secret)
    }
}
