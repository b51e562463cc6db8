//! Saga error types.

use common::GoodsId;
use inventory::InventoryError;
use thiserror::Error;

/// Errors that can occur during order placement.
///
/// `InsufficientStock` and `LockUnavailable` are reported to the caller
/// verbatim; retry policy, if any, belongs to the caller. Persistence
/// failures are reported only after compensation has run.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The user's cart has no checked items.
    #[error("no items selected in cart")]
    NoItemsSelected,

    /// Available stock is below the requested quantity.
    #[error("insufficient stock for goods {0}")]
    InsufficientStock(GoodsId),

    /// The per-goods stock lock could not be acquired in time.
    #[error("lock unavailable for goods {0}")]
    LockUnavailable(GoodsId),

    /// The goods id is unknown to the catalog or has no stock record.
    #[error("goods {0} not found")]
    GoodsNotFound(GoodsId),

    /// A durable write to the order ledger failed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// A catalog or cart collaborator call failed.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// The caller's deadline passed before the saga finished.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Inventory coordinator error not covered by the variants above.
    #[error("inventory error: {0}")]
    Inventory(InventoryError),
}

impl From<InventoryError> for SagaError {
    fn from(error: InventoryError) -> Self {
        match error {
            InventoryError::InsufficientStock(id) => SagaError::InsufficientStock(id),
            InventoryError::LockUnavailable(id) => SagaError::LockUnavailable(id),
            InventoryError::NotFound(id) => SagaError::GoodsNotFound(id),
            other => SagaError::Inventory(other),
        }
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
