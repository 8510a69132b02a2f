// ABOUTME: Unified error type, error codes, and HTTP error responses for the API
// ABOUTME: Maps storage, provider, and validation failures onto stable status codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # Unified Error Handling System
//!
//! Every fallible operation in the crate returns [`AppResult`]. An [`AppError`]
//! carries an [`ErrorCode`] that decides the HTTP status and the stable code
//! string a client sees, a human-readable message, and an optional source
//! error kept for logs only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat = 3002,

    // Resource Management (4000-4999)
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    #[serde(rename = "RESOURCE_CONFLICT")]
    ResourceConflict = 4001,

    // External Services (5000-5999)
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    #[serde(rename = "EXTERNAL_TIMEOUT")]
    ExternalTimeout = 5002,

    // Configuration (6000-6999)
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal Errors (9000-9999)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::InvalidFormat => 400,

            Self::ResourceNotFound => 404,

            Self::ResourceConflict => 409,

            // Upstream model failures are reported as a generic server error
            Self::ExternalServiceError
            | Self::ExternalTimeout
            | Self::ConfigError
            | Self::InternalError
            | Self::DatabaseError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidFormat => "The data format is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceConflict => "The resource was modified concurrently",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalTimeout => "An external service did not respond in time",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
        }
    }

    /// Whether the message is safe to echo back to clients
    const fn is_client_facing(self) -> bool {
        self.http_status() < 500
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Concurrent modification that could not be reconciled
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceConflict, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// External service did not answer within the deadline
    pub fn external_timeout(service: impl Into<String>, seconds: u64) -> Self {
        Self::new(
            ErrorCode::ExternalTimeout,
            format!("{} did not respond within {seconds}s", service.into()),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Stable error code
    pub code: ErrorCode,
    /// Message shown to the client
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        let message = if error.code.is_client_facing() {
            error.message.clone()
        } else {
            error.code.description().to_owned()
        };
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(code = ?self.code, source = ?self.source, "{}", self.message);
        } else {
            warn!(code = ?self.code, "{}", self.message);
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(error.to_string()).with_source(error)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        Self::database(format!("Migration failed: {error}")).with_source(error)
    }
}

/// Conversion from `anyhow::Error` to `AppError`
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(format!("{error:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidInput.http_status(), 400);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ResourceConflict.http_status(), 409);
        assert_eq!(ErrorCode::ExternalServiceError.http_status(), 500);
        assert_eq!(ErrorCode::ExternalTimeout.http_status(), 500);
        assert_eq!(ErrorCode::DatabaseError.http_status(), 500);
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let response = ErrorResponse::from(&AppError::not_found("User"));
        assert_eq!(response.error.code, ErrorCode::ResourceNotFound);
        assert_eq!(response.error.message, "User not found");
    }

    #[test]
    fn test_server_errors_hide_internal_detail() {
        let error = AppError::database("UNIQUE constraint failed: users.anonymous_id");
        let response = ErrorResponse::from(&error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("DATABASE_ERROR"));
        assert!(!json.contains("UNIQUE constraint"));
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::invalid_input("bad body").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::external_service("OpenAI", "no choices").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
