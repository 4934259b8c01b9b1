//! Typed errors and HTTP mapping onto the ExtJS envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::Envelope;

/// Wire message the grids recognise as a uniqueness collision.
pub const RULE_VIOLATION: &str = "rule_violation";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("config load: {0}")]
    Load(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("database: {0}")]
    Db(sqlx::Error),
    /// Server-side fault outside the database driver: unreadable stored rows, poisoned locks.
    #[error("internal: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.code().as_deref() == Some("23505") {
                return AppError::DuplicateKey(db.message().to_string());
            }
        }
        AppError::Db(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::NotFound(_) | AppError::DuplicateKey(_) => StatusCode::OK,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Config(_) | AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the failure envelope.
    pub fn wire_message(&self) -> String {
        match self {
            AppError::DuplicateKey(_) => RULE_VIOLATION.to_string(),
            AppError::Db(_) | AppError::Internal(_) => "storage error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(Envelope::failure(self.wire_message()))).into_response()
    }
}
