//! Inventory coordinator: reserve and release over the stock ledger.

use common::GoodsId;
use dist_lock::{DistributedMutex, LockError, LockStore};
use stock_ledger::{StockLedger, StockLedgerError, StockRecord};

use crate::batch::{ReservationRequest, validate_batch};
use crate::error::{InventoryError, ReserveFailure, Result};

/// Extra patience for the compensating path: a release that gives up on
/// a contended lock leaks a reservation permanently.
const RELEASE_LOCK_ATTEMPTS: u32 = 5;

/// Outcome of a `release` call.
///
/// `release` never fails as a whole; ids whose quantity could not be
/// restored are reported here and logged so the leak is visible.
#[derive(Debug, Default)]
pub struct ReleaseReport {
    /// Goods ids whose reservation could not be returned to stock.
    pub leaked: Vec<GoodsId>,
}

impl ReleaseReport {
    /// Returns true if every requested id was restored.
    pub fn is_complete(&self) -> bool {
        self.leaked.is_empty()
    }
}

/// Serializes all stock mutations through one distributed lock per
/// goods id.
///
/// This coordinator is the only component permitted to write stock
/// quantities; the ledger itself performs no locking.
#[derive(Clone)]
pub struct InventoryCoordinator<L, S> {
    ledger: L,
    mutex: DistributedMutex<S>,
}

/// Lock key for a goods id, shared by every process instance.
fn lock_key(goods_id: GoodsId) -> String {
    format!("inventory:lock:goods:{goods_id}")
}

impl<L, S> InventoryCoordinator<L, S>
where
    L: StockLedger,
    S: LockStore,
{
    /// Creates a coordinator over the given ledger and mutex.
    pub fn new(ledger: L, mutex: DistributedMutex<S>) -> Self {
        Self { ledger, mutex }
    }

    /// Returns a reference to the underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Reads the current stock record for a goods id.
    pub async fn stock_of(&self, goods_id: GoodsId) -> Result<StockRecord> {
        self.ledger.get(goods_id).await.map_err(map_ledger_error)
    }

    /// Provisions or resets the stock level for a goods id.
    ///
    /// Takes the per-goods lock like any other mutation so a manual
    /// correction cannot race an in-flight reservation.
    pub async fn set_stock(&self, goods_id: GoodsId, quantity: u32) -> Result<StockRecord> {
        let handle = self
            .mutex
            .acquire(&lock_key(goods_id))
            .await
            .map_err(|e| map_lock_error(e, goods_id))?;

        let result = self.ledger.put(goods_id, quantity).await;
        self.mutex.release(handle).await;

        result.map_err(map_ledger_error)
    }

    /// Reserves stock for every request in the batch, one id at a time.
    ///
    /// Each id's decrement runs under that id's lock. The call stops at
    /// the first failure; ids reserved earlier in the same call are NOT
    /// rolled back here — the returned [`ReserveFailure`] names them and
    /// rollback is the caller's responsibility.
    #[tracing::instrument(skip(self, batch), fields(batch_len = batch.len()))]
    pub async fn reserve(
        &self,
        batch: &[ReservationRequest],
    ) -> std::result::Result<(), ReserveFailure> {
        validate_batch(batch).map_err(ReserveFailure::clean)?;

        let mut reserved: Vec<ReservationRequest> = Vec::with_capacity(batch.len());

        for request in batch {
            if let Err(error) = self.reserve_one(request).await {
                tracing::warn!(
                    goods_id = %request.goods_id,
                    reserved = reserved.len(),
                    error = %error,
                    "reserve batch aborted"
                );
                return Err(ReserveFailure { reserved, error });
            }
            reserved.push(*request);
        }

        metrics::counter!("stock_reservations_total").increment(batch.len() as u64);
        Ok(())
    }

    /// Returns previously reserved stock, one id at a time.
    ///
    /// Symmetric to `reserve`: the increment runs while holding the
    /// per-goods lock. The call never fails as a whole — a lock that
    /// stays contended past the (extended) retry budget is logged and
    /// reported as leaked rather than aborting the remaining ids.
    #[tracing::instrument(skip(self, batch), fields(batch_len = batch.len()))]
    pub async fn release(&self, batch: &[ReservationRequest]) -> ReleaseReport {
        let mut report = ReleaseReport::default();

        for request in batch {
            if let Err(error) = self.release_one(request).await {
                metrics::counter!("stock_release_leaked_total").increment(1);
                tracing::error!(
                    goods_id = %request.goods_id,
                    quantity = request.quantity,
                    error = %error,
                    "failed to return reserved stock; quantity leaked"
                );
                report.leaked.push(request.goods_id);
            }
        }

        report
    }

    async fn reserve_one(&self, request: &ReservationRequest) -> Result<()> {
        let goods_id = request.goods_id;
        let handle = self
            .mutex
            .acquire(&lock_key(goods_id))
            .await
            .map_err(|e| map_lock_error(e, goods_id))?;

        let outcome = self.decrement_locked(request).await;
        self.mutex.release(handle).await;
        outcome
    }

    async fn decrement_locked(&self, request: &ReservationRequest) -> Result<()> {
        let record = self
            .ledger
            .get(request.goods_id)
            .await
            .map_err(map_ledger_error)?;

        if record.quantity < request.quantity {
            return Err(InventoryError::InsufficientStock(request.goods_id));
        }

        self.ledger
            .compare_and_set(
                request.goods_id,
                record.revision,
                record.quantity - request.quantity,
            )
            .await
            .map_err(fatal_write_error)?;

        Ok(())
    }

    async fn release_one(&self, request: &ReservationRequest) -> Result<()> {
        let goods_id = request.goods_id;
        let key = lock_key(goods_id);

        // Backoff by doubling the delay between single-shot attempts.
        let mut delay = self.mutex.config().retry_delay;
        let mut attempt = 1;
        let handle = loop {
            match self.mutex.acquire_with_budget(&key, 1, delay).await {
                Ok(handle) => break handle,
                Err(LockError::Unavailable { .. }) if attempt < RELEASE_LOCK_ATTEMPTS => {
                    tracing::debug!(goods_id = %goods_id, attempt, "release waiting on contended lock");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(map_lock_error(e, goods_id)),
            }
        };

        let outcome = self.increment_locked(request).await;
        self.mutex.release(handle).await;
        outcome
    }

    async fn increment_locked(&self, request: &ReservationRequest) -> Result<()> {
        let record = self
            .ledger
            .get(request.goods_id)
            .await
            .map_err(map_ledger_error)?;

        self.ledger
            .compare_and_set(
                request.goods_id,
                record.revision,
                record.quantity + request.quantity,
            )
            .await
            .map_err(fatal_write_error)?;

        metrics::counter!("stock_releases_total").increment(1);
        Ok(())
    }
}

fn map_lock_error(error: LockError, goods_id: GoodsId) -> InventoryError {
    match error {
        LockError::Unavailable { .. } => InventoryError::LockUnavailable(goods_id),
        other => InventoryError::Lock(other),
    }
}

fn map_ledger_error(error: StockLedgerError) -> InventoryError {
    match error {
        StockLedgerError::NotFound(goods_id) => InventoryError::NotFound(goods_id),
        other => InventoryError::Ledger(other),
    }
}

/// A write failure while holding the lock. A revision conflict here
/// means the lock failed to serialize writers — fatal to the operation.
fn fatal_write_error(error: StockLedgerError) -> InventoryError {
    if let StockLedgerError::RevisionConflict {
        goods_id,
        expected,
        actual,
    } = &error
    {
        tracing::error!(
            goods_id = %goods_id,
            expected = %expected,
            actual = %actual,
            "revision conflict while holding the goods lock; lock invariant violated"
        );
    }
    map_ledger_error(error)
}
