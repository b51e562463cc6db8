//! Stock record and revision types.

use common::GoodsId;
use serde::{Deserialize, Serialize};

/// Monotonically increasing revision of a stock record.
///
/// Advances by one on every successful write. Used by
/// [`crate::StockLedger::compare_and_set`] to detect writes that raced
/// past the per-goods lock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Revision(i64);

impl Revision {
    /// Creates a revision from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The revision assigned to a freshly provisioned record.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next revision.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw revision value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One durable stock counter, one record per goods id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// The goods this counter belongs to.
    pub goods_id: GoodsId,
    /// Units currently available. Never negative.
    pub quantity: u32,
    /// Write revision, advanced on every successful mutation.
    pub revision: Revision,
}

impl StockRecord {
    /// Creates a record for a freshly provisioned goods id.
    pub fn new(goods_id: GoodsId, quantity: u32) -> Self {
        Self {
            goods_id,
            quantity,
            revision: Revision::first(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_advances_by_one() {
        let r = Revision::first();
        assert_eq!(r.as_i64(), 1);
        assert_eq!(r.next().as_i64(), 2);
    }

    #[test]
    fn new_record_starts_at_first_revision() {
        let record = StockRecord::new(GoodsId::new(1), 10);
        assert_eq!(record.quantity, 10);
        assert_eq!(record.revision, Revision::first());
    }

    #[test]
    fn record_serialization_roundtrip() {
        let record = StockRecord::new(GoodsId::new(5), 3);
        let json = serde_json::to_string(&record).unwrap();
        let back: StockRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
