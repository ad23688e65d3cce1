//! # Lookup Error Types
//!
//! Errors for product search and sale submission.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Lookup Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Response            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  Status                 │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Decode                 │ │
//! │  │                 │  │                 │  │  Rejected               │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │    Internal     │  None of these is fatal. A failed search leaves   │
//! │  │                 │  the draft untouched; a failed submission keeps   │
//! │  │  ShuttingDown   │  the draft so the user can fix and resubmit.      │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for lookup operations.
pub type LookupResult<T> = Result<T, LookupError>;

#[derive(Debug, Error)]
pub enum LookupError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid lookup configuration.
    #[error("Invalid lookup configuration: {0}")]
    InvalidConfig(String),

    /// Base URL or endpoint path could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request could not be sent or the connection broke.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request did not finish within the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// Endpoint answered with an error status.
    #[error("Server answered {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// The sale form came back instead of a redirect: the server refused it.
    #[error("Sale was not saved: {0}")]
    Rejected(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// The debouncer task has stopped and no longer accepts commands.
    #[error("Search debouncer is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for LookupError {
    fn from(err: url::ParseError) -> Self {
        LookupError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        LookupError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LookupError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            LookupError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            LookupError::Http(err.to_string())
        }
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl LookupError {
    /// Returns true if repeating the same request could succeed.
    ///
    /// Informational only: searches are re-triggered by typing and
    /// submissions by the user, never automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Http(_) | LookupError::Timeout(_) => true,
            LookupError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(self, LookupError::InvalidConfig(_) | LookupError::InvalidUrl(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(LookupError::Http("connection refused".into()).is_retryable());
        assert!(LookupError::Timeout(10).is_retryable());
        assert!(LookupError::Status {
            status: 503,
            body: String::new()
        }
        .is_retryable());

        assert!(!LookupError::Status {
            status: 404,
            body: String::new()
        }
        .is_retryable());
        assert!(!LookupError::Decode("bad json".into()).is_retryable());
        assert!(!LookupError::Rejected("stock".into()).is_retryable());
    }

    #[test]
    fn test_config_errors() {
        assert!(LookupError::InvalidUrl("nope".into()).is_config_error());
        assert!(!LookupError::ShuttingDown.is_config_error());
    }

    #[test]
    fn test_url_parse_error_converts() {
        let err: LookupError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, LookupError::InvalidUrl(_)));
    }
}
