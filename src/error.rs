/// Error types for the microblog service
///
/// Domain code always returns the most specific error kind; only this module
/// converts kinds into transport-level status codes and the JSON envelope.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("User With Username {0} Not Found")]
    UserNotFound(String),

    #[error("User With Username {0} Already Exists")]
    UserDuplicated(String),

    #[error("User Not Allowed")]
    UserNotAllowed,

    #[error("Post With PostId {0} Not Found")]
    PostNotFound(i64),

    #[error("Post creation failed: {0}")]
    PostCreationFailed(String),

    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Upper-snake reason label used in the error envelope, e.g. `NOT_FOUND`.
    fn status_label(status: StatusCode) -> String {
        status
            .canonical_reason()
            .unwrap_or("UNKNOWN")
            .to_uppercase()
            .replace(' ', "_")
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::UserNotFound(_) | AppError::PostNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UserDuplicated(_)
            | AppError::PostCreationFailed(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotAllowed => StatusCode::FORBIDDEN,
            AppError::Unauthenticated | AppError::TokenInvalid | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Internal detail goes to the log, never to the client.
        let message = match self {
            AppError::Database(detail) | AppError::Internal(detail) => {
                tracing::error!(%detail, "unhandled server error");
                "Undefined error, check the server log".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(json!({
            "status": Self::status_label(status),
            "error": message,
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
