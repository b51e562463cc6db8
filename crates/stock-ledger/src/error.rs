//! Stock ledger error types.

use common::GoodsId;
use thiserror::Error;

use crate::record::Revision;

/// Errors that can occur during stock ledger operations.
#[derive(Debug, Error)]
pub enum StockLedgerError {
    /// No stock record exists for the goods id.
    #[error("no stock record for goods {0}")]
    NotFound(GoodsId),

    /// The record's revision did not match the expected revision.
    ///
    /// Writers are serialized by a per-goods lock, so a conflict here is
    /// an invariant violation rather than a normal contention outcome.
    #[error("revision conflict for goods {goods_id}: expected {expected}, actual {actual}")]
    RevisionConflict {
        goods_id: GoodsId,
        expected: Revision,
        actual: Revision,
    },

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for stock ledger results.
pub type Result<T> = std::result::Result<T, StockLedgerError>;
