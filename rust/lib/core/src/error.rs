use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these,
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from
/// `{"success": false, "code": "NOT_FOUND", "message": "..."}`.
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const INVALID_ID: &str = "INVALID_ID";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Message returned for every unclassified server fault. The underlying
/// error text is logged, never sent.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// One violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Wire name of the field (camelCase, e.g. `erCode`).
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always carries `success: false`,
/// the code and a message; validation failures also list every field:
///
/// ```json
/// {"success": false, "code": "VALIDATION_FAILED", "message": "Validation failed",
///  "errors": [{"field": "erCode", "message": "ER code must be ER followed by 6 digits"}]}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// One or more field constraints violated. HTTP 400.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Identifier is not well-formed for the store. HTTP 400.
    #[error("{0}")]
    InvalidId(String),

    /// Request could not be read (malformed JSON, bad query). HTTP 400.
    #[error("{0}")]
    BadRequest(String),

    /// Client exceeded its request budget. HTTP 429.
    #[error("Too many requests, please try again later")]
    RateLimited,

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::InvalidId(_) => error_code::INVALID_ID,
            ServiceError::BadRequest(_) => error_code::BAD_REQUEST,
            ServiceError::RateLimited => error_code::RATE_LIMITED,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to the caller.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Storage(_) | ServiceError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "request failed: {}", self);
        }

        let mut body = serde_json::json!({
            "success": false,
            "code": self.error_code(),
            "message": self.public_message(),
        });
        if let ServiceError::Validation(errors) = &self {
            body["errors"] = serde_json::json!(errors);
        }
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Validation(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::InvalidId("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ServiceError::Storage("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ServiceError::Validation(vec![]).error_code(), "VALIDATION_FAILED");
        assert_eq!(ServiceError::InvalidId("x".into()).error_code(), "INVALID_ID");
        assert_eq!(ServiceError::BadRequest("x".into()).error_code(), "BAD_REQUEST");
        assert_eq!(ServiceError::RateLimited.error_code(), "RATE_LIMITED");
        assert_eq!(ServiceError::Storage("x".into()).error_code(), "STORAGE_ERROR");
        assert_eq!(ServiceError::Internal("x".into()).error_code(), "INTERNAL");
    }

    #[tokio::test]
    async fn validation_response_lists_every_field() {
        let err = ServiceError::Validation(vec![
            FieldError::new("name", "Name is required"),
            FieldError::new("erCode", "ER code must be ER followed by 6 digits"),
        ]);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][1]["field"], "erCode");
    }

    #[tokio::test]
    async fn internal_detail_never_leaks() {
        let resp = ServiceError::Storage("redb: table 'kv' corrupted at page 7".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(resp).await;
        assert_eq!(body["message"], INTERNAL_MESSAGE);
        assert!(body.get("errors").is_none());
    }

    #[test]
    fn error_display_is_just_message() {
        assert_eq!(ServiceError::NotFound("Submission not found".into()).to_string(), "Submission not found");
        assert_eq!(ServiceError::InvalidId("Invalid submission id".into()).to_string(), "Invalid submission id");
        assert_eq!(ServiceError::Validation(vec![]).to_string(), "Validation failed");
    }
}
