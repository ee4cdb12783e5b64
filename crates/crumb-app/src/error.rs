//! Application-level errors.
//!
//! Wraps the domain and gateway errors and adds the lookup / concurrency
//! failures that only exist at the orchestration layer.

use thiserror::Error;

use crumb_core::CoreError;
use crumb_sync::SyncError;

/// Errors surfaced by the application service.
#[derive(Debug, Error)]
pub enum AppError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The persistence gateway failed in a way it could not absorb.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Referenced customer does not exist in the directory.
    #[error("customer not found: {id}")]
    CustomerNotFound { id: String },

    /// Referenced order does not exist.
    #[error("order not found: {id}")]
    OrderNotFound { id: String },

    /// Referenced financial record does not exist.
    #[error("financial record not found: {id}")]
    RecordNotFound { id: String },

    /// The record belongs to an order's lifecycle and cannot be deleted
    /// on its own.
    #[error("financial record {id} is managed by its order")]
    RecordManagedByOrder { id: String },

    /// A checkout is already being finalized.
    ///
    /// Double submissions must not bump customer counters twice.
    #[error("a checkout is already in progress")]
    CheckoutInProgress,
}

/// Convenience result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
