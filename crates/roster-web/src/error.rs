use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roster_core::{AuthError, StudentError};
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    Auth(String),
    TooManyRequests(String),
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Internal(msg) => {
                // Log the real error server-side, return generic message to client
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Auth(msg)
            | AppError::TooManyRequests(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg) => msg,
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::TokenInvalid => AppError::Auth(e.to_string()),
            AuthError::TooManyAttempts => AppError::TooManyRequests(e.to_string()),
            AuthError::PasswordMismatch => AppError::BadRequest(e.to_string()),
            AuthError::AlreadyExists(_) => AppError::Conflict(e.to_string()),
            AuthError::StoreUnavailable(_) | AuthError::Hashing(_) | AuthError::ConfigInvalid(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<StudentError> for AppError {
    fn from(e: StudentError) -> Self {
        match e {
            StudentError::NotFound(_) => AppError::NotFound(e.to_string()),
            StudentError::AlreadyExists(_) => AppError::Conflict(e.to_string()),
            StudentError::Validation(_) => AppError::BadRequest(e.to_string()),
            StudentError::StoreUnavailable(_) => AppError::Internal(e.to_string()),
        }
    }
}
