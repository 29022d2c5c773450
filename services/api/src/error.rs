//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// Custom error type for the API service
///
/// Authorization failures keep their two distinct paths: anonymous requests
/// are sent to the login entry point, authenticated-but-denied requests get
/// a 403. Neither is ever downgraded to a 404.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No (or invalid/expired) session token on a protected route
    #[error("Authentication required")]
    Unauthenticated,

    /// Login rejected: bad credentials or account not yet activated
    #[error("Invalid credentials or inactive account")]
    InvalidCredentials,

    /// Authenticated but not permitted
    #[error("Permission denied")]
    Forbidden,

    /// Referenced record absent
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Form submission failed one or more field constraints; no state change
    #[error("Validation failed")]
    Validation(HashMap<String, String>),

    /// Recoverable business-rule failure, surfaced as a user-visible notice
    #[error("{0}")]
    BusinessRule(String),

    /// Activation link failed verification, whatever the reason
    #[error("Activation link is invalid or has expired")]
    InvalidActivation,

    /// Anything unexpected, including storage-level integrity violations
    /// that slip past prevalidation
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Build a validation error for a single field
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), message.to_string());
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Anonymous visitors go to login, not a bare 401.
            ApiError::Unauthenticated => {
                return Redirect::to("/auth/login").into_response();
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({"error": "Invalid credentials or inactive account"}),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, json!({"error": "Permission denied"})),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({"error": format!("{} not found", what)}),
            ),
            ApiError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({"errors": errors}))
            }
            ApiError::BusinessRule(msg) => (StatusCode::BAD_REQUEST, json!({"error": msg})),
            ApiError::InvalidActivation => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Activation link is invalid or has expired"}),
            ),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal server error"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_is_not_a_not_found() {
        let response = ApiError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn unauthenticated_redirects_to_login() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::LOCATION)
                .unwrap(),
            "/auth/login"
        );
    }

    #[test]
    fn validation_carries_field_errors() {
        let response = ApiError::field("name", "This field is required").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
