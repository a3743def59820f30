use thiserror::Error;

/// Upstream codes an amenity or listing provider uses for transient refusals.
pub(crate) const RETRYABLE_UPSTREAM_CODES: &[&str] = &["QUOTA_EXCEEDED", "RATE_LIMITED", "TIMEOUT"];

/// Errors returned by amenity and listing lookups.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Network or TLS failure, or a non-2xx status, from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with `success: false`.
    #[error("lookup failed ({code}): {message}")]
    Upstream { code: String, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl LookupError {
    #[must_use]
    pub fn upstream(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`crate::SearchCoordinator`] operations. Lookup
/// failures never appear here; they are recorded on the category instead.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Validation(#[from] rentscout_core::CoreError),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("no viewport has been reported yet")]
    NoViewport,
}
