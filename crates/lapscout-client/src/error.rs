use thiserror::Error;

/// Errors returned by the listing backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response carrying the backend's `{"detail": "..."}` body.
    /// The detail is shown to the user verbatim.
    #[error("{detail}")]
    Backend { status: u16, detail: String },

    /// Non-2xx response without a usable `detail` field.
    #[error("unknown error (HTTP {status})")]
    UnknownBackend { status: u16 },

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

impl ApiError {
    /// True when the request never produced an HTTP response in time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Http(e) if e.is_timeout())
    }
}
