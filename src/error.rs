use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Interaction could not be recorded: {0}")]
    PersistenceFailure(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Stable machine-readable discriminator carried in the error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::PersistenceFailure(_) => "persistence_failure",
            AppError::Storage(_) => "storage",
        }
    }
}

/// JSON error body returned by every API endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub kind: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(msg) => {
                tracing::debug!(error = %msg, "Record not found");
                StatusCode::NOT_FOUND
            }
            AppError::PersistenceFailure(msg) => {
                tracing::error!(error = %msg, "Interaction write failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
            kind: self.kind().to_string(),
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
