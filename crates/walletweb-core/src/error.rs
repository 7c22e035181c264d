//! Error types for walletweb-core
//!
//! This module provides error handling for the core transaction
//! functionality, including error codes, detailed messages, and suggestions.

use thiserror::Error;
use serde::{Deserialize, Serialize};
use std::io;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No dataset loaded
    NotLoaded,
    /// Transaction not found
    TransactionNotFound,
    /// Report not found in history
    ReportNotFound,
    /// Parse error
    ParseError,
    /// Validation error
    ValidationError,
    /// Nothing selected for export
    EmptySelection,
    /// A report is already being generated
    AlreadyGenerating,
    /// Operation was cancelled
    Cancelled,
    /// IO error
    IoError,
    /// Invalid data format
    InvalidFormat,
    /// Duplicate entry
    DuplicateEntry,
    /// Operation not supported
    NotSupported,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotLoaded => write!(f, "NOT_LOADED"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::ReportNotFound => write!(f, "REPORT_NOT_FOUND"),
            ErrorCode::ParseError => write!(f, "PARSE_ERROR"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::EmptySelection => write!(f, "EMPTY_SELECTION"),
            ErrorCode::AlreadyGenerating => write!(f, "ALREADY_GENERATING"),
            ErrorCode::Cancelled => write!(f, "CANCELLED"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::DuplicateEntry => write!(f, "DUPLICATE_ENTRY"),
            ErrorCode::NotSupported => write!(f, "NOT_SUPPORTED"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for walletweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No dataset loaded")]
    NotLoaded,

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Report not found: {id}")]
    ReportNotFound { id: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("No transactions match the selected range")]
    EmptySelection,

    #[error("A report is already being generated")]
    AlreadyGenerating,

    #[error("Report generation was cancelled")]
    Cancelled,

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Duplicate entry: {entry}")]
    DuplicateEntry { entry: String },

    #[error("Operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError { message: message.into() }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotLoaded => ErrorCode::NotLoaded,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::ReportNotFound { .. } => ErrorCode::ReportNotFound,
            CoreError::ParseError { .. } => ErrorCode::ParseError,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::EmptySelection => ErrorCode::EmptySelection,
            CoreError::AlreadyGenerating => ErrorCode::AlreadyGenerating,
            CoreError::Cancelled => ErrorCode::Cancelled,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            CoreError::NotSupported { .. } => ErrorCode::NotSupported,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NotLoaded => ErrorSeverity::Warning,
            CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::ReportNotFound { .. } => ErrorSeverity::Info,
            CoreError::ParseError { .. } => ErrorSeverity::Error,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::EmptySelection => ErrorSeverity::Info,
            CoreError::AlreadyGenerating => ErrorSeverity::Info,
            CoreError::Cancelled => ErrorSeverity::Info,
            CoreError::IoError { .. } => ErrorSeverity::Error,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::DuplicateEntry { .. } => ErrorSeverity::Warning,
            CoreError::NotSupported { .. } => ErrorSeverity::Warning,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(
            self.code(),
            self.to_string(),
        );

        match self {
            CoreError::TransactionNotFound { .. } => {
                details = details.with_suggestion(
                    "Check if the transaction ID is correct.".to_string()
                );
                details = details.with_suggestion(
                    "Use the /api/transactions endpoint to list all transactions.".to_string()
                );
            }
            CoreError::ReportNotFound { .. } => {
                details = details.with_suggestion(
                    "Only the most recent reports are kept; generate it again.".to_string()
                );
            }
            CoreError::ParseError { message } => {
                details = details.with_detail(serde_json::json!({ "parse_message": message }));
                details = details.with_suggestion(
                    "Check the syntax of your dataset file.".to_string()
                );
                details = details.with_suggestion(
                    "Dates must look like YYYY-MM-DD and amounts must be non-negative.".to_string()
                );
            }
            CoreError::ValidationError { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
                details = details.with_suggestion(
                    "Review the validation message for specific requirements.".to_string()
                );
            }
            CoreError::EmptySelection => {
                details = details.with_suggestion(
                    "Choose a wider date range or clear the filters.".to_string()
                );
            }
            CoreError::AlreadyGenerating => {
                details = details.with_suggestion(
                    "Wait for the current report or cancel it first.".to_string()
                );
            }
            CoreError::NotSupported { operation } => {
                details = details.with_suggestion(
                    format!("The operation '{}' is not available in this build.", operation)
                );
                details = details.with_suggestion(
                    "CSV downloads are always available.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(error: io::Error) -> Self {
        CoreError::IoError { message: error.to_string() }
    }
}

impl From<walletweb_parser::ParseError> for CoreError {
    fn from(error: walletweb_parser::ParseError) -> Self {
        match error {
            walletweb_parser::ParseError::IoError(e) => CoreError::from(e),
            walletweb_parser::ParseError::UnsupportedFormat { path } => CoreError::InvalidFormat {
                message: format!("no loader for '{}' (expected .json, .yaml or .csv)", path),
            },
            other => CoreError::ParseError { message: other.to_string() },
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Request ID for tracing
    pub request_id: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: String) -> Self {
        Self {
            request_id: None,
            operation,
            data: serde_json::json!({}),
        }
    }

    /// Add request ID
    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info => log::info!(
                target: "walletweb::error",
                "[{}] {} - Operation: {} - Request: {:?}",
                error.code(),
                error,
                context.operation,
                context.request_id
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "walletweb::error",
                "[{}] {} - Operation: {} - Request: {:?}",
                error.code(),
                error,
                context.operation,
                context.request_id
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "walletweb::error",
                "ERROR [{}] {} - Operation: {} - Request: {:?} - Data: {}",
                error.code(),
                error.to_details(),
                context.operation,
                context.request_id,
                context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "walletweb::error",
            "WARNING: {} - Operation: {} - Request: {:?}",
            message,
            context.operation,
            context.request_id
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::NotLoaded.to_string(), "NOT_LOADED");
        assert_eq!(ErrorCode::EmptySelection.to_string(), "EMPTY_SELECTION");
        assert_eq!(ErrorCode::ParseError.to_string(), "PARSE_ERROR");
    }

    #[test]
    fn test_error_code_serializes_like_display() {
        let json = serde_json::to_string(&ErrorCode::AlreadyGenerating).unwrap();
        assert_eq!(json, "\"ALREADY_GENERATING\"");
    }

    #[test]
    fn test_core_error_severity() {
        assert_eq!(CoreError::NotLoaded.severity(), ErrorSeverity::Warning);
        assert_eq!(CoreError::EmptySelection.severity(), ErrorSeverity::Info);
        assert_eq!(
            CoreError::InternalError { message: "x".to_string() }.severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_error_details_parse_error() {
        let error = CoreError::ParseError {
            message: "Invalid syntax".to_string()
        };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::ParseError);
        assert!(details.details.is_some());
        assert_eq!(details.suggestions.len(), 2);
    }

    #[test]
    fn test_from_parse_error() {
        let err: CoreError = walletweb_parser::ParseError::UnsupportedFormat {
            path: "a.bean".to_string(),
        }.into();
        assert_eq!(err.code(), ErrorCode::InvalidFormat);

        let err: CoreError = walletweb_parser::ParseError::InvalidRecord {
            location: "tx.json:3".to_string(),
            message: "unparseable date 'x'".to_string(),
        }.into();
        assert_eq!(err.code(), ErrorCode::ParseError);
        assert!(err.to_string().contains("tx.json:3"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("generate_report".to_string())
            .with_request_id("req-123".to_string())
            .with_data("format", serde_json::json!("csv"));

        assert_eq!(context.operation, "generate_report");
        assert_eq!(context.request_id, Some("req-123".to_string()));
        assert_eq!(context.data["format"], "csv");
    }
}
