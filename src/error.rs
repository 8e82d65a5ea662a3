//! Error handling and failure classification
//!
//! One crate-wide error enum covers every failure the pipeline can surface.
//! Transport failures are classified into the taxonomy by priority-ordered
//! pattern checks; an unrecognized failure resolves to `Unknown` rather than
//! leaking raw transport internals to the caller.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("could not encode input for transmission: {0}")]
    Encoding(String),

    #[error("authentication failed: {0} (check that GEMINI_API_KEY is set and valid)")]
    Auth(String),

    #[error("API quota exhausted: {0} (check your plan and billing, or retry later)")]
    QuotaExceeded(String),

    #[error("network failure reaching the generation service: {0}")]
    Network(String),

    #[error("the outbound request was rejected as malformed: {0}")]
    BadRequest(String),

    #[error("the credential lacks permission for this operation: {0}")]
    Forbidden(String),

    #[error("generation service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("no model candidate produced a usable response")]
    NoWorkingModel,

    #[error("the model response contained no JSON object")]
    NoStructuredOutput,

    #[error("found a JSON-like span in the model response but it would not parse: {0}")]
    MalformedFreeform(String),

    #[error("schema-constrained response was not valid JSON: {0}")]
    MalformedSchema(String),

    #[error("response JSON does not match the expected report shape: {0}")]
    ShapeMismatch(String),

    #[error("unclassified failure: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Maps an HTTP status and response body onto the error taxonomy.
///
/// Checks run in a fixed priority order and the first match wins:
/// credential problems, then quota, then request shape, then permission,
/// then availability. Substring checks are case-insensitive.
pub fn classify_http(status: u16, body: &str) -> Error {
    let lower = body.to_lowercase();
    let detail = || summarize(status, body);

    if status == 401
        || lower.contains("api key not valid")
        || lower.contains("api_key_invalid")
        || lower.contains("api key")
        || lower.contains("unauthenticated")
        || lower.contains("unauthorized")
    {
        return Error::Auth(detail());
    }
    if status == 429
        || lower.contains("quota")
        || lower.contains("rate limit")
        || lower.contains("resource_exhausted")
    {
        return Error::QuotaExceeded(detail());
    }
    if lower.contains("network") || lower.contains("connection") || lower.contains("fetch") {
        return Error::Network(detail());
    }
    if status == 400 || lower.contains("invalid_argument") {
        return Error::BadRequest(detail());
    }
    if status == 403 || lower.contains("permission_denied") || lower.contains("forbidden") {
        return Error::Forbidden(detail());
    }
    if status == 404 || lower.contains("not found") || lower.contains("not_found") {
        // No NotFound category: a retired model name reads as the service
        // being unavailable for that candidate.
        return Error::ServiceUnavailable(detail());
    }
    if status >= 500
        || lower.contains("internal error")
        || lower.contains("overloaded")
        || lower.contains("unavailable")
    {
        return Error::ServiceUnavailable(detail());
    }

    Error::Unknown(detail())
}

/// Maps a reqwest transport failure (no HTTP response reached us, or the
/// failure carries a status) onto the taxonomy.
pub fn classify_transport(err: reqwest::Error) -> Error {
    if let Some(status) = err.status() {
        return classify_http(status.as_u16(), &err.to_string());
    }
    if err.is_timeout() || err.is_connect() || err.is_request() {
        return Error::Network(err.to_string());
    }
    Error::Unknown(err.to_string())
}

fn summarize(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {status}");
    }
    // Bodies can be multi-KB JSON error envelopes; keep the head for the
    // message and leave the full body to the debug logs.
    let head: String = trimmed.chars().take(200).collect();
    format!("HTTP {status}: {head}")
}
