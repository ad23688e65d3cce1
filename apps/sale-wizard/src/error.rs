//! # App Error Type
//!
//! Unified error type for wizard commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Sale Wizard                        │
//! │                                                                         │
//! │  Terminal                    Rust                                       │
//! │  ────────                    ────                                       │
//! │                                                                         │
//! │  > qty 1 12                                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Controller method                                               │  │
//! │  │  AppResult<T>                                                    │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Draft rule? ──── CoreError::InsufficientStock ──┐               │  │
//! │  │         │                                        │               │  │
//! │  │         ▼                                        ▼               │  │
//! │  │  Remote call? ─── LookupError::Status ─────── AppError ────────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ! Insufficient stock for Cuaderno: available 10, requested 12         │
//! │                                                                         │
//! │  Every error is printed and the loop keeps going. The draft is never   │
//! │  changed by a failed command.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gest_core::{CoreError, ValidationError};
use gest_lookup::LookupError;
use serde::Serialize;
use thiserror::Error;

/// Result alias for wizard operations.
pub type AppResult<T> = Result<T, AppError>;

/// Error shown to the user.
///
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for Cuaderno: available 3, requested 5" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation or step gate failed
    ValidationError,

    /// Requested quantity above the captured stock
    InsufficientStock,

    /// No line item / search result at the given position
    NotFound,

    /// Step navigation refused
    Navigation,

    /// Search or submission request failed
    RemoteError,

    /// The server refused the sale
    SaleRejected,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// Unknown or malformed terminal command
    UnknownCommand,

    /// Internal error (channels, I/O)
    Internal,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn not_found(what: &str, position: usize) -> Self {
        AppError::new(
            ErrorCode::NotFound,
            format!("No {} at position {}", what, position),
        )
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ConfigError, message)
    }

    pub fn unknown_command(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::UnknownCommand, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to app errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock { .. } => {
                AppError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            // Positions are shown 1-based in the terminal
            CoreError::LineItemNotFound(index) => AppError::not_found("line item", index + 1),
            CoreError::AmountOverflow { .. } => AppError::validation(err.to_string()),
            CoreError::AlreadyAtLastStep => AppError::new(ErrorCode::Navigation, err.to_string()),
            CoreError::Validation(e) => AppError::from(e),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Converts lookup errors to app errors.
impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Rejected(_) => AppError::new(ErrorCode::SaleRejected, err.to_string()),
            LookupError::InvalidConfig(_) | LookupError::InvalidUrl(_) => {
                AppError::config(err.to_string())
            }
            LookupError::ShuttingDown => {
                tracing::error!("Search debouncer unavailable: {}", err);
                AppError::internal(err.to_string())
            }
            other => AppError::new(ErrorCode::RemoteError, other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::internal(format!("I/O error: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::config(format!("Invalid config file: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_conversion() {
        let err: AppError = CoreError::InsufficientStock {
            product: "Cuaderno".into(),
            available: 3,
            requested: 5,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(
            err.message,
            "Insufficient stock for Cuaderno: available 3, requested 5"
        );

        let err: AppError = CoreError::LineItemNotFound(0).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "No line item at position 1");

        let err: AppError = CoreError::AmountOverflow {
            product: "Tornillo".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Amount too large for Tornillo");
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: AppError = CoreError::Validation(ValidationError::NoLineItems).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.to_string(), "At least one product must be added");
    }

    #[test]
    fn test_lookup_error_conversion() {
        let err: AppError = LookupError::Rejected("stock".into()).into();
        assert_eq!(err.code, ErrorCode::SaleRejected);

        let err: AppError = LookupError::Timeout(10).into();
        assert_eq!(err.code, ErrorCode::RemoteError);
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_string(&AppError::validation("customer is required")).unwrap();
        assert_eq!(
            json,
            r#"{"code":"VALIDATION_ERROR","message":"customer is required"}"#
        );
    }
}
