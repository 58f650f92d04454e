//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how workflow
//! errors are reported to HTTP clients.

use crate::config::ConfigError;
use axum::http::StatusCode;
use booking_core::{PortError, WorkflowError};
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps a workflow failure onto the status code and message a handler returns.
/// Unexpected gateway failures are logged and their details kept server-side.
pub fn workflow_error(context: &str, e: WorkflowError) -> (StatusCode, String) {
    match e {
        WorkflowError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        WorkflowError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        WorkflowError::Gateway(PortError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
        WorkflowError::Gateway(PortError::Conflict(msg)) => (StatusCode::CONFLICT, msg),
        WorkflowError::Gateway(PortError::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
        }
        WorkflowError::Gateway(PortError::Unexpected(msg)) => {
            error!("{}: {}", context, msg);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}
