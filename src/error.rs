//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::services::{llm::LlmError, rate_limit::MAX_REQUESTS_PER_WINDOW};

/// Rejections produced by the API-key gateway.
///
/// These are the only outcomes of a gateway check that a client is told
/// about in detail. Store failures during the check surface as
/// [`AppError::Database`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// No credential matches the presented token.
    #[error("Invalid API key")]
    InvalidKey,

    /// The credential exists but its expiry lies in the past.
    #[error("API key has expired")]
    KeyExpired,

    /// The user already spent the hourly allowance.
    #[error(
        "Rate limit exceeded ({limit} requests/hour). Try again in {retry_after_minutes} minutes.",
        limit = MAX_REQUESTS_PER_WINDOW
    )]
    RateLimitExceeded { retry_after_minutes: i64 },
}

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code. Internal failures
/// never leak their details to the client; they are logged instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Public API call without a usable `Authorization: Bearer` header.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Unauthorized: Missing API key. Use 'Authorization: Bearer YOUR_API_KEY'")]
    MissingApiKey,

    /// The gateway rejected the presented API key.
    ///
    /// Returns HTTP 401 for invalid or expired keys, 429 when rate limited.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Session token is missing or does not verify.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Unauthorized")]
    Unauthorized,

    /// Requested resource does not exist or belongs to another user.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("{0}")]
    NotFound(&'static str),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    InvalidRequest(String),

    /// The LLM provider failed or answered with something unusable.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// A page could not be fetched for text extraction.
    #[error("Extraction failed: {0}")]
    Extraction(String),
}

/// Unreadable request bodies (bad syntax, wrong types, missing fields or
/// content type) are client errors like any other validation failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// { "error": "Human-readable error message" }
/// ```
///
/// # Status Code Mapping
///
/// - `MissingApiKey`, `Unauthorized`, `Gateway(InvalidKey | KeyExpired)` → 401
/// - `Gateway(RateLimitExceeded)` → 429
/// - `NotFound` → 404
/// - `InvalidRequest` → 400
/// - `Database`, `Llm`, `Extraction` → 500 (details only in the log)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingApiKey | AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::Gateway(ref rejection) => {
                let status = match rejection {
                    GatewayError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
                    GatewayError::InvalidKey | GatewayError::KeyExpired => {
                        StatusCode::UNAUTHORIZED
                    }
                };
                (status, rejection.to_string())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(ref e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Llm(ref e) => {
                tracing::error!(error = %e, "LLM call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error while generating FAQ".to_string(),
                )
            }
            AppError::Extraction(ref e) => {
                tracing::error!(error = %e, "website extraction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error while extracting website information".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn gateway_rejections_map_to_distinct_statuses() {
        let (status, body) = render(GatewayError::InvalidKey.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid API key");

        let (status, body) = render(GatewayError::KeyExpired.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "API key has expired");

        let (status, body) = render(
            GatewayError::RateLimitExceeded {
                retry_after_minutes: 50,
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body["error"],
            "Rate limit exceeded (15 requests/hour). Try again in 50 minutes."
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = render(AppError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, body) = render(AppError::Extraction("dns failure".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("dns"));
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let (status, body) = render(AppError::InvalidRequest("Title is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title is required");

        let (status, body) = render(AppError::NotFound("FAQ set not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "FAQ set not found");
    }
}
