//! Error types and HTTP error response handling.
//!
//! This module defines the errors the HTTP layer can produce and how they are
//! converted into responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::models::Sport;
use crate::storage::StoreError;

/// Why the gateway refused a request.
///
/// Each reason has its own status and machine-readable code so callers can
/// tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Missing API key. Use 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header")]
    MissingCredential,

    #[error("Invalid API key")]
    InvalidCredential,

    #[error("API key has been revoked")]
    Revoked,

    #[error("API key has expired")]
    Expired,

    #[error("API key does not have access to {sport} data")]
    ScopeForbidden { sport: Sport },

    /// `retry_after_secs` is whole seconds until a token is available, at least 1.
    #[error("Rate limit exceeded. Retry in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::MissingCredential
            | Rejection::InvalidCredential
            | Rejection::Revoked
            | Rejection::Expired => StatusCode::UNAUTHORIZED,
            Rejection::ScopeForbidden { .. } => StatusCode::FORBIDDEN,
            Rejection::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Rejection::MissingCredential => "missing_api_key",
            Rejection::InvalidCredential => "invalid_api_key",
            Rejection::Revoked => "api_key_revoked",
            Rejection::Expired => "api_key_expired",
            Rejection::ScopeForbidden { .. } => "sport_forbidden",
            Rejection::RateLimited { .. } => "rate_limit_exceeded",
        }
    }
}

/// Application-wide HTTP error type.
///
/// # Error Categories
///
/// - **Gateway rejections**: credential, scope and rate problems
/// - **Storage errors**: any sqlx or store failure, details hidden from clients
/// - **Resource errors**: requested match not found
/// - **Validation errors**: malformed query parameters
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Returns HTTP 404 Not Found.
    #[error("Match not found")]
    MatchNotFound,

    /// Request parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `Rejected` → 401 / 403 / 429 depending on the reason, 429 adds `Retry-After`
/// - `MatchNotFound` → 404 Not Found
/// - `InvalidRequest` → 400 Bad Request
/// - `Database` / `Store` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Rejected(rejection) => {
                (rejection.status(), rejection.code(), rejection.to_string())
            }
            AppError::MatchNotFound => {
                (StatusCode::NOT_FOUND, "match_not_found", self.to_string())
            }
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(_) | AppError::Store(_) => {
                error!(error = %self, "Request failed with a storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        let mut response = (status, body).into_response();
        if let AppError::Rejected(Rejection::RateLimited { retry_after_secs }) = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
