use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth and admin account errors
/// - E2xxx: Player blacklist errors
/// - E3xxx: Avatar errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    BadRequest,
    Conflict,
    ServiceUnavailable,

    // Auth (E1xxx)
    InvalidCredentials,
    TokenExpired,
    TokenInvalid,
    AdminInactive,
    PasswordTooWeak,
    InvalidCurrentPassword,
    UsernameTaken,
    EmailTaken,
    SuperAdminRequired,

    // Players (E2xxx)
    PlayerNotFound,
    InvalidNickname,
    ReasonTooShort,
    ReporterRequired,
    PlayerAlreadyListed,
    NicknameTaken,

    // Avatars (E3xxx)
    AvatarUnavailable,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::BadRequest => "E0006",
            Self::Conflict => "E0007",
            Self::ServiceUnavailable => "E0008",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::TokenExpired => "E1002",
            Self::TokenInvalid => "E1003",
            Self::AdminInactive => "E1004",
            Self::PasswordTooWeak => "E1005",
            Self::InvalidCurrentPassword => "E1006",
            Self::UsernameTaken => "E1007",
            Self::EmailTaken => "E1008",
            Self::SuperAdminRequired => "E1009",

            // Players
            Self::PlayerNotFound => "E2001",
            Self::InvalidNickname => "E2002",
            Self::ReasonTooShort => "E2003",
            Self::ReporterRequired => "E2004",
            Self::PlayerAlreadyListed => "E2005",
            Self::NicknameTaken => "E2006",

            // Avatars
            Self::AvatarUnavailable => "E3001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::InvalidCurrentPassword | Self::InvalidNickname | Self::ReasonTooShort
            | Self::ReporterRequired => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::PlayerNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid | Self::AdminInactive => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::SuperAdminRequired => StatusCode::FORBIDDEN,
            Self::Conflict | Self::UsernameTaken | Self::EmailTaken
            | Self::PlayerAlreadyListed | Self::NicknameTaken => StatusCode::CONFLICT,
            Self::AvatarUnavailable => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Status code this error will be rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Known { code, .. } => code.status_code(),
            AppError::Database(diesel::result::Error::NotFound) => StatusCode::NOT_FOUND,
            AppError::Database(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) | AppError::Database(_) | AppError::Pool(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new(ErrorCode::InternalError.code(), "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new(ErrorCode::NotFound.code(), "resource not found"),
                    ),
                    diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => (
                        StatusCode::CONFLICT,
                        ApiErrorResponse::new(ErrorCode::Conflict.code(), "resource already exists"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new(ErrorCode::InternalError.code(), "database error"),
                    ),
                }
            }
            AppError::Pool(err) => {
                tracing::error!(error = %err, "database pool error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new(ErrorCode::InternalError.code(), "database error"),
                )
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new(ErrorCode::ValidationError.code(), msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn known_error_envelope() {
        let (status, value) =
            body_json(AppError::new(ErrorCode::PlayerNotFound, "player not found")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "E2001");
        assert_eq!(value["error"]["message"], "player not found");
        assert!(value["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn details_are_included() {
        let err = AppError::with_details(
            ErrorCode::ValidationError,
            "invalid input",
            serde_json::json!({ "field": "email" }),
        );
        let (status, value) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"]["details"]["field"], "email");
    }

    #[tokio::test]
    async fn database_errors_are_generic() {
        let (status, value) =
            body_json(AppError::Database(diesel::result::Error::RollbackTransaction)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["error"]["message"], "database error");
    }

    #[tokio::test]
    async fn missing_row_is_not_found() {
        let (status, value) = body_json(AppError::Database(diesel::result::Error::NotFound)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["error"]["code"], "E0003");
    }

    #[test]
    fn auth_codes_are_unauthorized() {
        for code in [
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::AdminInactive,
        ] {
            assert_eq!(code.status_code(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(ErrorCode::SuperAdminRequired.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn conflicts_map_to_409() {
        assert_eq!(ErrorCode::PlayerAlreadyListed.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::NicknameTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::UsernameTaken.status_code(), StatusCode::CONFLICT);
    }
}
