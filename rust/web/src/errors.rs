/// Error handling shared by every HTTP-facing component.
///
/// This module provides:
/// - [`HandError`], the outcome of any rejected hand operation
/// - HTTP status code mappings through [`IntoErrorResponse`]
/// - The JSON error body returned by all endpoints
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

use crate::ids::SeatIndex;

/// Standard error response format for all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "guard_violation")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        reply::with_status(reply::json(&self), status).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Client errors (4xx) - expected, normal operation
    Client,
    /// Server errors (5xx) - unexpected, needs investigation
    Server,
    /// Critical errors - system integrity at risk
    Critical,
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait IntoErrorResponse {
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error code
    fn error_code(&self) -> &'static str;

    fn error_message(&self) -> String;

    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    fn severity(&self) -> ErrorSeverity {
        if self.status_code().is_server_error() {
            ErrorSeverity::Server
        } else {
            ErrorSeverity::Client
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        if let Some(details) = self.error_details() {
            ErrorResponse::with_details(self.error_code(), self.error_message(), details)
        } else {
            ErrorResponse::new(self.error_code(), self.error_message())
        }
    }

    /// Convert to HTTP response, logging at the level matching the severity
    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code();
        let severity = self.severity();
        let error_response = self.to_error_response();

        match severity {
            ErrorSeverity::Client => tracing::info!(
                error_code = %error_response.error,
                status = status.as_u16(),
                "client error: {}",
                error_response.message
            ),
            ErrorSeverity::Server => tracing::error!(
                error_code = %error_response.error,
                status = status.as_u16(),
                "server error: {}",
                error_response.message
            ),
            ErrorSeverity::Critical => tracing::error!(
                error_code = %error_response.error,
                status = status.as_u16(),
                critical = true,
                "critical error: {}",
                error_response.message
            ),
        }

        error_response.into_response(status)
    }
}

/// Why a hand operation was refused.
///
/// Validation and guard failures are raised before the rules engine is
/// touched, so a refused action never changes the hand.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandError {
    /// Malformed request: bad identifiers, unknown action, missing amount.
    #[error("{0}")]
    Validation(String),
    /// Well-formed but not allowed in the current betting context.
    #[error("{message}")]
    Guard {
        message: String,
        expected_player_id: Option<SeatIndex>,
    },
    #[error("Hand {0} not found")]
    NotFound(String),
    /// Persisting or reading archived hands failed.
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Hand storage lock poisoned")]
    StoragePoisoned,
}

impl HandError {
    pub fn validation(message: impl Into<String>) -> Self {
        HandError::Validation(message.into())
    }

    pub fn guard(message: impl Into<String>) -> Self {
        HandError::Guard {
            message: message.into(),
            expected_player_id: None,
        }
    }

    pub fn not_your_turn(player: SeatIndex, expected: SeatIndex) -> Self {
        HandError::Guard {
            message: format!(
                "Player {player} is not the active player. Current active player is {expected}."
            ),
            expected_player_id: Some(expected),
        }
    }
}

impl IntoErrorResponse for HandError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandError::Validation(_) | HandError::Guard { .. } => StatusCode::BAD_REQUEST,
            HandError::NotFound(_) => StatusCode::NOT_FOUND,
            HandError::Storage(_) | HandError::StoragePoisoned => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            HandError::Validation(_) => "validation_error",
            HandError::Guard { .. } => "guard_violation",
            HandError::NotFound(_) => "hand_not_found",
            HandError::Storage(_) => "storage_error",
            HandError::StoragePoisoned => "hand_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            HandError::Guard {
                expected_player_id: Some(expected),
                ..
            } => Some(json!({ "expected_player_id": expected.to_string() })),
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            HandError::StoragePoisoned => ErrorSeverity::Critical,
            HandError::Storage(_) => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}
