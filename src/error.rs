use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// The message shown for every failed login, whatever the cause.
pub const GENERIC_LOGIN_FAILURE: &str = "Incorrect email or password.";

/// A single violated input rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The name of the offending field.
    pub field: String,
    /// A human readable description of the violated rule.
    pub reason: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Why a login attempt was rejected.
///
/// Callers only ever see [`GENERIC_LOGIN_FAILURE`]; the distinction is kept
/// for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No account is registered under the submitted email.
    UnknownEmail,
    /// The account exists but the password does not match.
    PasswordMismatch,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::UnknownEmail => f.write_str("user not found"),
            AuthFailure::PasswordMismatch => f.write_str("incorrect password"),
        }
    }
}

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// One or more submitted fields are malformed.
    #[error("Validation error: {}", join_reasons(.0))]
    Validation(Vec<FieldError>),

    /// Credentials were rejected.
    #[error("Authentication failed: {0}")]
    Authentication(AuthFailure),

    /// An account already exists for this email.
    #[error("A user with this email already exists")]
    DuplicateUser,

    /// A lookup by a unique key matched more than one record.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// A PostgreSQL error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection could not be taken from the pool.
    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The pool could not be built.
    #[error("Database pool creation error: {0}")]
    PoolCreation(#[from] deadpool_postgres::CreatePoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// An encryption or hashing error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// A session payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] sonic_rs::Error),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

fn join_reasons(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Serialize)]
struct ValidationBody {
    error: &'static str,
    errors: Vec<String>,
}

impl AppError {
    /// The messages of a validation failure, in field order. Empty for other errors.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(ref errors) => {
                tracing::debug!("Validation error: {}", join_reasons(errors));
                let body = sonic_rs::to_string(&ValidationBody {
                    error: "Validation failed",
                    errors: errors.iter().map(ToString::to_string).collect(),
                })
                .unwrap_or_else(|_| r#"{"error":"Validation failed"}"#.to_string());
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::Authentication(cause) => {
                tracing::warn!("Authentication failed: {}", cause);
                (StatusCode::UNAUTHORIZED, GENERIC_LOGIN_FAILURE.to_string())
            }

            AppError::DuplicateUser => {
                tracing::info!("Duplicate signup rejected");
                (StatusCode::CONFLICT, "An account with this email already exists".to_string())
            }

            AppError::Integrity(ref msg) => {
                tracing::error!("Integrity error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Pool(ref e) => {
                tracing::error!("Database pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::PoolCreation(ref e) => {
                tracing::error!("Database pool creation error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session store error".to_string())
            }

            AppError::Encryption(ref msg) => {
                tracing::error!("Encryption error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Encryption error".to_string())
            }

            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_causes_share_one_public_message() {
        let unknown = AppError::Authentication(AuthFailure::UnknownEmail).into_response();
        let mismatch = AppError::Authentication(AuthFailure::PasswordMismatch).into_response();

        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(mismatch.status(), StatusCode::UNAUTHORIZED);
        assert_ne!(AuthFailure::UnknownEmail, AuthFailure::PasswordMismatch);
    }

    #[test]
    fn validation_display_keeps_field_order() {
        let err = AppError::Validation(vec![
            FieldError { field: "email".into(), reason: "not a valid email address".into() },
            FieldError { field: "name".into(), reason: "not alphanumeric".into() },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation error: email: not a valid email address; name: not alphanumeric"
        );
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
