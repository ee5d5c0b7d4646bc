use crate::response::ApiResponse;
use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::ValidationError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The request could not be read at all (bad JSON, bad form, bad path).
    #[error("{0}")]
    BadRequest(String),
    /// The body was larger than the router's body limit.
    #[error("Request body is too large")]
    PayloadTooLarge,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(format!("Invalid form data: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::BadRequest("Invalid client id".to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Database(DbError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Database(DbError::PoolExhausted | DbError::ConnectionError(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Database(
                DbError::QueryError(_)
                | DbError::MigrationError(_)
                | DbError::ConnectionConfigError(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts our custom `AppError` into an enveloped HTTP response.
///
/// Store failures are logged in full and reported to the caller only as a
/// generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Database(DbError::NotFound) => "Client not found".to_string(),
            AppError::Database(db_err) if db_err.is_unavailable() => {
                tracing::error!(error = ?db_err, "Database unavailable.");
                "The database is temporarily unavailable, please retry later".to_string()
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                "An internal database error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, ApiResponse::failure(message)).into_response()
    }
}
