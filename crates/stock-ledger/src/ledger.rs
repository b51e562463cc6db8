//! Stock ledger storage trait.

use async_trait::async_trait;
use common::GoodsId;

use crate::error::Result;
use crate::record::{Revision, StockRecord};

/// Storage abstraction for per-goods stock counters.
///
/// Implementations perform no locking of their own; callers must hold the
/// per-goods distributed lock across the read-modify-write cycle.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Fetches the stock record for a goods id.
    ///
    /// Returns [`crate::StockLedgerError::NotFound`] if the goods was
    /// never provisioned.
    async fn get(&self, goods_id: GoodsId) -> Result<StockRecord>;

    /// Writes a new quantity if the stored revision matches `expected`.
    ///
    /// On success the revision advances by one and the updated record is
    /// returned. A mismatch yields
    /// [`crate::StockLedgerError::RevisionConflict`].
    async fn compare_and_set(
        &self,
        goods_id: GoodsId,
        expected: Revision,
        new_quantity: u32,
    ) -> Result<StockRecord>;

    /// Provisions or resets the stock level for a goods id.
    ///
    /// Creates the record if absent; otherwise overwrites the quantity
    /// and advances the revision.
    async fn put(&self, goods_id: GoodsId, quantity: u32) -> Result<StockRecord>;
}
