use thiserror::Error;

/// MiddlewareError represents failures setting up the CSP response layer
#[derive(Error, Debug)]
pub enum MiddlewareError {
    /// Neither an enforced nor a report-only policy is configured, so the
    /// middleware has nothing to do and should be left out of the chain
    #[error("No Content Security Policy configured")]
    NotUsed,

    /// Configuration could not be deserialized
    #[error("Invalid CSP configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl MiddlewareError {
    /// Returns true if the error only means the middleware should be skipped
    pub fn is_not_used(&self) -> bool {
        matches!(self, MiddlewareError::NotUsed)
    }
}

/// Result type for middleware setup
pub type MiddlewareResult<T> = Result<T, MiddlewareError>;
