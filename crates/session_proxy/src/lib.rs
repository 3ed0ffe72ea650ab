//! session_proxy - ChatKit session issuance
//!
//! Exchanges the server-held API key for a short-lived client secret and
//! turns every upstream failure into one [`NormalizedError`].

pub mod config;
pub mod controllers;
pub mod error;
pub mod issuer;
pub mod middleware;
pub mod normalize;
pub mod server;
pub mod upstream;

pub use config::ProxyConfig;
pub use error::{ErrorCode, ErrorResponse, NormalizedError};
pub use issuer::{SessionCredential, SessionIssuer, SessionRequest, UpstreamSessionIssuer};
pub use server::{app_config, run, serve, AppState};
pub use upstream::{UpstreamClient, UpstreamFailure};
