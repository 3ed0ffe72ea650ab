use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Stable error codes returned to callers of the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    QuotaExceeded,
    RateLimited,
    Unauthorized,
    Forbidden,
    UpstreamError,
    UpstreamTimeout,
    InternalError,
    /// Fallthrough bucket: `unknown`, or the upstream's own code when it sent one.
    Passthrough(String),
}

impl ErrorCode {
    pub fn unknown() -> Self {
        Self::Passthrough("unknown".to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::QuotaExceeded => "quota_exceeded",
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::UpstreamError => "upstream_error",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::InternalError => "internal_error",
            Self::Passthrough(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The single error shape the proxy hands back to its callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{http} {code} - {message}")]
pub struct NormalizedError {
    pub http: u16,
    pub code: ErrorCode,
    pub message: String,
    /// Seconds the caller should wait before retrying, when upstream said so.
    pub retry_after: Option<u64>,
}

impl NormalizedError {
    pub fn new(http: u16, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            http,
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Option<u64>) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub fn upstream_timeout() -> Self {
        Self::new(504, ErrorCode::UpstreamTimeout, "No response from OpenAI")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, ErrorCode::InternalError, message)
    }

    pub fn body(&self) -> ErrorEnvelope<'_> {
        ErrorEnvelope {
            error: ErrorBody {
                code: self.code.as_str(),
                message: &self.message,
                retry_after: self.retry_after,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    pub error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Owned form of the error envelope, for consumers parsing the endpoint's output.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub retry_after: Option<u64>,
}

impl ResponseError for NormalizedError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
