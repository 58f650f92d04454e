//! crates/booking_core/src/error.rs
//!
//! The error type every workflow operation returns.

use crate::ports::PortError;

/// What a caller of a workflow can observe going wrong.
///
/// A later step failing after an earlier one committed is handled inside the
/// workflow (compensated or logged) and is reported, if at all, as the
/// `Gateway` error of the step that failed.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Malformed or missing input, or a transition the entity does not allow.
    /// Raised before any write is attempted.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The acting account may not perform this operation on this entity.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The data gateway call itself failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] PortError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
