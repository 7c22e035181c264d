//! Error types for walletweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use walletweb_core::{CoreError, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(e) => match e.code() {
                ErrorCode::TransactionNotFound | ErrorCode::ReportNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ValidationError
                | ErrorCode::EmptySelection
                | ErrorCode::InvalidFormat
                | ErrorCode::ParseError => StatusCode::BAD_REQUEST,
                ErrorCode::AlreadyGenerating | ErrorCode::DuplicateEntry => StatusCode::CONFLICT,
                ErrorCode::NotSupported => StatusCode::NOT_IMPLEMENTED,
                ErrorCode::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::Cancelled => StatusCode::GONE,
                ErrorCode::IoError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(e) => e.to_details(),
            ApiError::NotFound { .. } => ErrorDetails::new(ErrorCode::ReportNotFound, self.to_string()),
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::ValidationError, self.to_string()),
            ApiError::InternalError { .. } => ErrorDetails::new(ErrorCode::InternalError, self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Core(e) if status.is_server_error() => {
                DefaultErrorLogger.log_error(e, &ErrorContext::new("http request".to_string()));
            }
            _ if status.is_server_error() => log::error!("{}", self),
            _ => log::debug!("{} -> {}", self, status),
        }
        (status, Json(self.to_details())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_status() {
        let err = ApiError::from(CoreError::TransactionNotFound { id: "x".to_string() });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(CoreError::AlreadyGenerating).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(CoreError::validation("bad")).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_details_carry_core_code() {
        let details = ApiError::from(CoreError::EmptySelection).to_details();
        assert_eq!(details.code, ErrorCode::EmptySelection);
        assert_eq!(ApiError::bad_request("nope").to_details().code, ErrorCode::ValidationError);
    }
}
