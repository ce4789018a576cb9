//! Boundary error taxonomy
//!
//! Every handler converts infrastructure failures to one of these variants
//! at its own boundary. Internal causes are logged server-side and never
//! reach the caller.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use super::response::ApiResponse;
use crate::auth::{PasswordError, TokenError};
use crate::db::DbError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input (400)
    #[error("{0}")]
    Validation(String),
    /// Bad credentials or invalid/expired token (401)
    #[error("{0}")]
    Auth(String),
    /// Referenced entity absent (404)
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness violation (409)
    #[error("{0}")]
    Conflict(String),
    /// Anything unexpected (500); the cause stays server-side
    #[error("Error interno del servidor")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn validation(message: &str) -> Self {
        ApiError::Validation(message.to_string())
    }

    pub fn auth(message: &str) -> Self {
        ApiError::Auth(message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        ApiError::NotFound(message.to_string())
    }

    pub fn conflict(message: &str) -> Self {
        ApiError::Conflict(message.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(cause) = self {
            error!(error = %cause, "Unhandled internal error");
        }

        HttpResponse::build(self.status_code()).json(ApiResponse::failure(&self.to_string()))
    }
}
