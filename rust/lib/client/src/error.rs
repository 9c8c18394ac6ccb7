pub use intake_core::FieldError;

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Server {
        status: u16,
        /// Stable error code from the body, if any.
        code: Option<String>,
        message: String,
        errors: Vec<FieldError>,
    },

    /// The request never reached the server (connection refused, reset,
    /// DNS failure). The only retry-eligible failure.
    #[error("network: {0}")]
    Network(String),

    /// No response within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// The request could not be built or followed (bad base URL, redirect
    /// loop). Retrying cannot help.
    #[error("request: {0}")]
    Request(String),

    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether a submit may be retried after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_errors_retry() {
        assert!(ApiError::Network("connection refused".into()).is_retryable());
        assert!(!ApiError::Timeout.is_retryable());
        assert!(!ApiError::Decode("eof".into()).is_retryable());
        assert!(!ApiError::Request("builder error".into()).is_retryable());
        assert!(!ApiError::Server {
            status: 503,
            code: None,
            message: "unavailable".into(),
            errors: vec![],
        }
        .is_retryable());
    }
}
