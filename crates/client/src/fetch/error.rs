//! Fetch error types.

/// Errors from the HTTP fetch pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request timeout")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    /// Non-success response.
    #[error("HTTP error: {status}")]
    Status { status: u16 },

    /// Body exceeded the download cap.
    #[error("response too large: {size} bytes exceeds {limit}")]
    TooLarge { size: usize, limit: usize },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout } else { FetchError::Network(err.to_string()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::Status { status: 404 };
        assert_eq!(err.to_string(), "HTTP error: 404");

        let err = FetchError::TooLarge { size: 11, limit: 10 };
        assert!(err.to_string().contains("exceeds 10"));
    }
}
