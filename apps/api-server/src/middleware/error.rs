//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use postline_core::domain::KeyError;
use postline_core::error::{DomainError, TimelineError};
use postline_shared::ErrorResponse;
use std::fmt;
use std::time::Duration;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized,
    Timeout(Duration),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Timeout(limit) => write!(f, "Timed out after {:?}", limit),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Timeout(limit) => {
                tracing::warn!(?limit, "Store call timed out");
                ErrorResponse::gateway_timeout("The record store did not answer in time")
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidReference(e) => AppError::BadRequest(format!("Invalid post key: {}", e)),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Timeline(TimelineError::Timeout(limit)) => AppError::Timeout(limit),
            DomainError::Timeline(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<KeyError> for AppError {
    fn from(err: KeyError) -> Self {
        AppError::BadRequest(format!("Invalid post key: {}", err))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use postline_core::error::RepoError;

    #[test]
    fn test_domain_errors_map_to_status() {
        let cases = [
            (
                DomainError::InvalidReference(KeyError::Empty),
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                DomainError::Timeline(TimelineError::Timeout(Duration::from_secs(1))),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                DomainError::Timeline(TimelineError::Store(RepoError::Query("boom".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }
}
