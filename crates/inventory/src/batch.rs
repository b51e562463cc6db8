//! Reservation batch requests.

use std::collections::HashSet;

use common::GoodsId;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// One line of a reservation batch: decrement (or, on release,
/// increment) `quantity` units of `goods_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub goods_id: GoodsId,
    pub quantity: u32,
}

impl ReservationRequest {
    /// Creates a reservation request.
    pub fn new(goods_id: GoodsId, quantity: u32) -> Self {
        Self { goods_id, quantity }
    }
}

/// Rejects batches with duplicate goods ids or zero quantities.
///
/// Behavior on duplicates is undefined downstream (the second request
/// would deadlock against the first id's lock), so they are refused
/// before any lock is taken.
pub(crate) fn validate_batch(batch: &[ReservationRequest]) -> Result<(), InventoryError> {
    let mut seen = HashSet::with_capacity(batch.len());
    for request in batch {
        if request.quantity == 0 {
            return Err(InventoryError::InvalidQuantity(request.goods_id));
        }
        if !seen.insert(request.goods_id) {
            return Err(InventoryError::DuplicateGoodsId(request.goods_id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_batch_passes() {
        let batch = vec![
            ReservationRequest::new(GoodsId::new(1), 2),
            ReservationRequest::new(GoodsId::new(2), 1),
        ];
        assert!(validate_batch(&batch).is_ok());
    }

    #[test]
    fn empty_batch_passes() {
        assert!(validate_batch(&[]).is_ok());
    }

    #[test]
    fn duplicate_goods_id_is_rejected() {
        let batch = vec![
            ReservationRequest::new(GoodsId::new(1), 2),
            ReservationRequest::new(GoodsId::new(1), 1),
        ];
        assert!(matches!(
            validate_batch(&batch),
            Err(InventoryError::DuplicateGoodsId(id)) if id == GoodsId::new(1)
        ));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let batch = vec![ReservationRequest::new(GoodsId::new(3), 0)];
        assert!(matches!(
            validate_batch(&batch),
            Err(InventoryError::InvalidQuantity(id)) if id == GoodsId::new(3)
        ));
    }
}
