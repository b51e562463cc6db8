//! Inventory coordinator error types.

use common::GoodsId;
use dist_lock::LockError;
use stock_ledger::StockLedgerError;
use thiserror::Error;

use crate::batch::ReservationRequest;

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Available quantity is below the requested amount.
    #[error("insufficient stock for goods {0}")]
    InsufficientStock(GoodsId),

    /// The per-goods lock could not be acquired within the retry budget.
    #[error("lock unavailable for goods {0}")]
    LockUnavailable(GoodsId),

    /// No stock record exists for the goods id.
    #[error("no stock record for goods {0}")]
    NotFound(GoodsId),

    /// The batch contains the same goods id more than once.
    #[error("duplicate goods {0} in batch")]
    DuplicateGoodsId(GoodsId),

    /// The batch contains a zero-quantity request.
    #[error("zero quantity requested for goods {0}")]
    InvalidQuantity(GoodsId),

    /// Stock ledger error, including revision conflicts, which indicate
    /// a lock-correctness bug rather than normal contention.
    #[error("stock ledger error: {0}")]
    Ledger(#[from] StockLedgerError),

    /// Lock store error.
    #[error("lock error: {0}")]
    Lock(#[from] LockError),
}

/// A failed `reserve` call, carrying the prefix of the batch that was
/// already reserved before the failure.
///
/// The coordinator does not roll these back itself; the caller must
/// issue a `release` for exactly `reserved`.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ReserveFailure {
    /// Requests that succeeded before the failing one, in batch order.
    pub reserved: Vec<ReservationRequest>,
    /// The error that stopped the batch.
    pub error: InventoryError,
}

impl ReserveFailure {
    /// A failure before anything was reserved.
    pub fn clean(error: InventoryError) -> Self {
        Self {
            reserved: Vec::new(),
            error,
        }
    }
}

/// Convenience type alias for inventory results.
pub type Result<T> = std::result::Result<T, InventoryError>;
