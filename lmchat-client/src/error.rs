//! Client errors and HTTP error mapping.

/// Errors raised before a response stream is established.
///
/// Once streaming starts, failures are reported through the stream's
/// [`StreamOutcome`](lmchat_types::StreamOutcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No server address was configured.
    #[error("server address is empty")]
    EmptyServerAddress,
    /// The query text was empty.
    #[error("query is empty")]
    EmptyQuery,
    /// The request was cancelled before the server responded.
    #[error("cancelled")]
    Cancelled,
    /// Connection, DNS or TLS failure.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body text, possibly empty.
        body: String,
    },
}

impl ClientError {
    /// Whether re-sending the same request might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Map a non-success response to a [`ClientError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ClientError {
    ClientError::Http {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Map a [`reqwest::Error`] to a [`ClientError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    ClientError::Network(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_500_is_retryable() {
        let err = map_http_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "model crashed");
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "HTTP 500: model crashed");
    }

    #[test]
    fn status_429_is_retryable() {
        let err = map_http_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.is_retryable());
    }

    #[test]
    fn status_400_is_not_retryable() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "bad body");
        assert!(!err.is_retryable());
        assert!(matches!(err, ClientError::Http { status: 400, ref body } if body == "bad body"));
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        assert!(!ClientError::EmptyQuery.is_retryable());
        assert!(!ClientError::EmptyServerAddress.is_retryable());
        assert!(!ClientError::Cancelled.is_retryable());
    }

    #[test]
    fn empty_body_preserved_in_error() {
        let err = map_http_status(reqwest::StatusCode::NOT_FOUND, "");
        assert!(matches!(err, ClientError::Http { status: 404, ref body } if body.is_empty()));
    }
}
