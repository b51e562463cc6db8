use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::GoodsId;
use tokio::sync::RwLock;

use crate::error::{Result, StockLedgerError};
use crate::ledger::StockLedger;
use crate::record::{Revision, StockRecord};

/// In-memory stock ledger implementation for testing.
///
/// Stores all records in memory and provides the same interface as the
/// PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryStockLedger {
    records: Arc<RwLock<HashMap<GoodsId, StockRecord>>>,
}

impl InMemoryStockLedger {
    /// Creates a new empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current quantity for a goods id, if provisioned.
    pub async fn quantity_of(&self, goods_id: GoodsId) -> Option<u32> {
        self.records.read().await.get(&goods_id).map(|r| r.quantity)
    }

    /// Returns the number of provisioned records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn get(&self, goods_id: GoodsId) -> Result<StockRecord> {
        self.records
            .read()
            .await
            .get(&goods_id)
            .copied()
            .ok_or(StockLedgerError::NotFound(goods_id))
    }

    async fn compare_and_set(
        &self,
        goods_id: GoodsId,
        expected: Revision,
        new_quantity: u32,
    ) -> Result<StockRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&goods_id)
            .ok_or(StockLedgerError::NotFound(goods_id))?;

        if record.revision != expected {
            return Err(StockLedgerError::RevisionConflict {
                goods_id,
                expected,
                actual: record.revision,
            });
        }

        record.quantity = new_quantity;
        record.revision = record.revision.next();
        Ok(*record)
    }

    async fn put(&self, goods_id: GoodsId, quantity: u32) -> Result<StockRecord> {
        let mut records = self.records.write().await;
        let record = records
            .entry(goods_id)
            .and_modify(|r| {
                r.quantity = quantity;
                r.revision = r.revision.next();
            })
            .or_insert_with(|| StockRecord::new(goods_id, quantity));
        Ok(*record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_record_is_not_found() {
        let ledger = InMemoryStockLedger::new();
        let result = ledger.get(GoodsId::new(1)).await;
        assert!(matches!(result, Err(StockLedgerError::NotFound(_))));
    }

    #[tokio::test]
    async fn put_provisions_and_resets() {
        let ledger = InMemoryStockLedger::new();
        let goods = GoodsId::new(1);

        let created = ledger.put(goods, 10).await.unwrap();
        assert_eq!(created.quantity, 10);
        assert_eq!(created.revision, Revision::first());

        let reset = ledger.put(goods, 4).await.unwrap();
        assert_eq!(reset.quantity, 4);
        assert_eq!(reset.revision, Revision::first().next());
    }

    #[tokio::test]
    async fn compare_and_set_advances_revision() {
        let ledger = InMemoryStockLedger::new();
        let goods = GoodsId::new(2);
        let record = ledger.put(goods, 10).await.unwrap();

        let updated = ledger
            .compare_and_set(goods, record.revision, 7)
            .await
            .unwrap();
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.revision, record.revision.next());
    }

    #[tokio::test]
    async fn compare_and_set_with_stale_revision_conflicts() {
        let ledger = InMemoryStockLedger::new();
        let goods = GoodsId::new(3);
        let record = ledger.put(goods, 10).await.unwrap();

        ledger
            .compare_and_set(goods, record.revision, 7)
            .await
            .unwrap();

        // Stale revision from before the first write
        let result = ledger.compare_and_set(goods, record.revision, 5).await;
        assert!(matches!(
            result,
            Err(StockLedgerError::RevisionConflict { .. })
        ));

        // Quantity unchanged by the failed write
        assert_eq!(ledger.quantity_of(goods).await, Some(7));
    }

    #[tokio::test]
    async fn compare_and_set_missing_record_is_not_found() {
        let ledger = InMemoryStockLedger::new();
        let result = ledger
            .compare_and_set(GoodsId::new(9), Revision::first(), 1)
            .await;
        assert!(matches!(result, Err(StockLedgerError::NotFound(_))));
    }
}
