/// Errors that can occur when talking to a monitoring backend.
///
/// These cover the transport and wire-format layer only; domain validation
/// failures are [`unimon_common::UnimonError`] and flow through the
/// provider trait's `anyhow::Result` unchanged.
///
/// # Examples
///
/// ```rust
/// use unimon_provider::error::ProviderError;
///
/// let err = ProviderError::UnsupportedProvider("nagios".to_string());
/// assert!(err.to_string().contains("nagios"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Non-2xx status code from the backend HTTP endpoint.
    #[error("Backend HTTP error: status={status}, body={body}")]
    HttpError { status: u16, body: String },

    /// The backend answered 2xx but the payload carries an in-band error
    /// object (for Zabbix: the JSON-RPC `error` member).
    #[error("Backend API error: code={code}, message={message}, data={data}")]
    ApiError {
        code: i64,
        message: String,
        data: String,
    },

    /// An underlying HTTP transport error from `reqwest`.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON serialization or deserialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Structurally valid JSON that is missing a required member.
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    /// The requested provider type is not registered.
    #[error("Unsupported monitoring provider: {0}")]
    UnsupportedProvider(String),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
