//! Maps [`UpstreamFailure`] onto the caller-facing [`NormalizedError`] taxonomy.

use crate::error::{ErrorCode, NormalizedError};
use crate::upstream::{UpstreamErrorObject, UpstreamFailure};

const QUOTA_CODES: &[&str] = &["insufficient_quota"];
const RATE_LIMIT_CODES: &[&str] = &["rate_limit_exceeded", "requests_exceeded"];
const AUTH_CODES: &[&str] = &["invalid_api_key"];

pub fn normalize(failure: UpstreamFailure) -> NormalizedError {
    match failure {
        UpstreamFailure::UpstreamRejected {
            status,
            retry_after,
            error,
        } => normalize_rejection(status, retry_after.as_deref(), &error),
        // The transport error text stays out of the response.
        UpstreamFailure::UpstreamUnreachable { .. } => NormalizedError::upstream_timeout(),
        UpstreamFailure::LocalDispatchFailure { message } => NormalizedError::internal(message),
    }
}

/// Rules apply in order; the first match wins.
pub fn normalize_rejection(
    status: u16,
    retry_after: Option<&str>,
    error: &UpstreamErrorObject,
) -> NormalizedError {
    let code = error.effective_code();
    let code_in = |set: &[&str]| code.is_some_and(|code| set.contains(&code));

    if status == 402 || code_in(QUOTA_CODES) {
        return NormalizedError::new(402, ErrorCode::QuotaExceeded, "OpenAI quota exceeded");
    }
    if status == 429 || code_in(RATE_LIMIT_CODES) {
        return NormalizedError::new(429, ErrorCode::RateLimited, "Rate limit exceeded")
            .with_retry_after(retry_after.and_then(parse_retry_after));
    }
    if status == 401 || code_in(AUTH_CODES) {
        return NormalizedError::new(
            401,
            ErrorCode::Unauthorized,
            "Invalid/unauthorized API key",
        );
    }
    if status == 403 {
        return NormalizedError::new(403, ErrorCode::Forbidden, "Forbidden");
    }
    if status >= 500 {
        return NormalizedError::new(502, ErrorCode::UpstreamError, "Upstream error from OpenAI");
    }

    NormalizedError::new(
        status,
        code.map(|code| ErrorCode::Passthrough(code.to_string()))
            .unwrap_or_else(ErrorCode::unknown),
        error.effective_message().unwrap_or("Unexpected error"),
    )
}

/// Delta-seconds form only. Fractions round up; zero or anything
/// non-numeric (including HTTP dates) yields `None`.
pub fn parse_retry_after(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return (secs > 0).then_some(secs);
    }
    let secs = raw.parse::<f64>().ok()?;
    (secs.is_finite() && secs > 0.0).then(|| secs.ceil() as u64)
}
