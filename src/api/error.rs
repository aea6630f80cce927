//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::{AuthError, RegistrationError, TokenError};
use crate::db::DatabaseError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Every individual reason, when a request was rejected for several.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Token expired")]
    TokenExpired,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Registration rejected")]
    Rejected(Vec<String>),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
                Vec::new(),
            ),
            ApiError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Token expired, re-authenticate".to_string(),
                Vec::new(),
            ),
            ApiError::NotFound(detail) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", detail, Vec::new())
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail, Vec::new())
            }
            ApiError::Rejected(reasons) => (
                StatusCode::BAD_REQUEST,
                "REGISTRATION_REJECTED",
                reasons.first().cloned().unwrap_or_default(),
                reasons,
            ),
            ApiError::Conflict(detail) => {
                (StatusCode::CONFLICT, "CONFLICT", detail, Vec::new())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            e @ (DatabaseError::InvalidEnum { .. } | DatabaseError::UnknownRelation { .. }) => {
                ApiError::BadRequest(e.to_string())
            }
            DatabaseError::ConstraintViolation(detail) => ApiError::Conflict(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Malformed
            | TokenError::UnsupportedAlgorithm(_)
            | TokenError::InvalidSignature
            | TokenError::NotYetValid
            | TokenError::WrongIssuer
            | TokenError::WrongAudience => ApiError::Unauthorized,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => ApiError::from(e),
            AuthError::Token(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Rejected(_) => ApiError::Rejected(err.messages()),
            RegistrationError::Internal(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    use crate::auth::IdentityError;

    async fn json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let (status, json) = json(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn expired_token_maps_to_token_expired() {
        let (status, json) = json(TokenError::Expired.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "TOKEN_EXPIRED");
    }

    #[tokio::test]
    async fn bad_signature_is_plain_unauthorized() {
        let (status, json) = json(TokenError::InvalidSignature.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let (status, json) = json(ApiError::Internal("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn constraint_violation_is_a_conflict() {
        let err: ApiError =
            DatabaseError::ConstraintViolation("FOREIGN KEY constraint failed".into()).into();
        let (status, json) = json(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["message"], "FOREIGN KEY constraint failed");
    }

    #[tokio::test]
    async fn auth_store_errors_keep_their_status() {
        let err: ApiError =
            AuthError::Database(DatabaseError::ConstraintViolation("UNIQUE".into())).into();
        let (status, _) = json(err).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let err: ApiError = AuthError::Database(DatabaseError::LockPoisoned).into();
        let (status, json) = json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn unknown_relation_is_a_bad_request() {
        let err: ApiError = DatabaseError::UnknownRelation {
            entity_type: "Floor",
            relation: "Roof".into(),
        }
        .into();
        let (status, json) = json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], "Unknown relation 'Roof' on Floor");
    }

    #[tokio::test]
    async fn rejected_registration_lists_every_reason() {
        let err: ApiError = RegistrationError::Rejected(vec![
            IdentityError::PasswordRequiresDigit,
            IdentityError::PasswordRequiresUpper,
        ])
        .into();
        let (status, json) = json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "REGISTRATION_REJECTED");
        assert_eq!(
            json["error"]["message"],
            "Passwords must have at least one digit ('0'-'9')."
        );
        assert_eq!(json["error"]["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn store_failure_during_registration_is_internal() {
        let err: ApiError = RegistrationError::Internal(DatabaseError::LockPoisoned).into();
        let (status, _) = json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
