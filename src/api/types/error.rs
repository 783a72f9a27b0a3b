//! JSON error envelope returned by every endpoint
//!
//! Bodies look like `{"error": {"message", "type", "param"?, "code"?}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AuthError, DomainError};

/// Coarse error category, derived from the HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    NotFoundError,
    ServerError,
}

impl ApiErrorType {
    pub fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::AuthenticationError,
            StatusCode::NOT_FOUND => Self::NotFoundError,
            s if s.is_client_error() => Self::InvalidRequestError,
            _ => Self::ServerError,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Status code plus envelope; handlers return `Result<_, ApiError>`
#[derive(Debug, Error)]
#[error("{status}: {}", .response.error.message)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type: ApiErrorType::for_status(status),
                    param: None,
                    code: None,
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Name the request field at fault
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    /// Machine-readable reason
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.response.error.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => {
                Self::bad_request(message).with_code("validation_failed")
            }
            DomainError::Conflict { message } => Self::bad_request(message).with_code("conflict"),
            DomainError::Configuration { message }
            | DomainError::Internal { message }
            | DomainError::Storage { message } => {
                tracing::error!(error = %message, "Request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();

        let (status, code) = match err {
            AuthError::AlreadyExists { .. } => (StatusCode::BAD_REQUEST, "user_exists"),
            AuthError::NotFound => (StatusCode::UNAUTHORIZED, "user_not_found"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_password"),
            AuthError::InvalidToken { .. } => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "token_expired"),
            AuthError::Domain(domain) => return domain.into(),
        };

        Self::new(status, message).with_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_follows_status() {
        assert_eq!(
            ApiError::bad_request("x").response.error.error_type,
            ApiErrorType::InvalidRequestError
        );
        assert_eq!(
            ApiError::unauthorized("x").response.error.error_type,
            ApiErrorType::AuthenticationError
        );
        assert_eq!(
            ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "x").response.error.error_type,
            ApiErrorType::InvalidRequestError
        );
        assert_eq!(
            ApiError::new(StatusCode::BAD_GATEWAY, "x").response.error.error_type,
            ApiErrorType::ServerError
        );
    }

    #[test]
    fn test_domain_error_conversion() {
        let api_err: ApiError = DomainError::not_found("Product not found.").into();
        assert_eq!(api_err.status, StatusCode::NOT_FOUND);
        assert_eq!(api_err.message(), "Product not found.");

        let api_err: ApiError =
            DomainError::validation("Product name exceeds 50 characters").into();
        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_err.response.error.code.as_deref(), Some("validation_failed"));

        let api_err: ApiError = DomainError::storage("connection reset by peer").into();
        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api_err.message().contains("connection reset"));
    }

    #[test]
    fn test_auth_error_conversion() {
        let cases = [
            (
                AuthError::AlreadyExists {
                    username: "alice".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "User already exists.",
            ),
            (AuthError::NotFound, StatusCode::UNAUTHORIZED, "User not found"),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED, "Invalid password"),
            (AuthError::TokenExpired, StatusCode::UNAUTHORIZED, "Token expired"),
        ];

        for (err, status, message) in cases {
            let api_err: ApiError = err.into();
            assert_eq!(api_err.status, status);
            assert_eq!(api_err.message(), message);
        }

        let api_err: ApiError = AuthError::invalid_token("issuer mismatch").into();
        assert_eq!(api_err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api_err.response.error.code.as_deref(), Some("invalid_token"));

        let api_err: ApiError = AuthError::Domain(DomainError::storage("pool timed out")).into();
        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_envelope_shape() {
        let err = ApiError::bad_request("Invalid product ID 'abc'").with_param("id");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["param"], "id");
        assert!(json["error"].get("code").is_none());
        assert_eq!(err.to_string(), "400 Bad Request: Invalid product ID 'abc'");
    }
}
