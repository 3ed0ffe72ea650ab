//! Upstream provider access: wire models, the HTTP client, and the failure
//! union the client produces.

mod client;
mod failure;
pub mod models;

pub use client::UpstreamClient;
pub use failure::UpstreamFailure;
pub use models::{UpstreamErrorObject, UpstreamSession};
