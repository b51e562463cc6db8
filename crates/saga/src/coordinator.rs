//! Order placement saga coordinator.

use std::time::Instant;

use common::UserId;
use dist_lock::LockStore;
use inventory::{InventoryCoordinator, ReservationRequest};
use stock_ledger::StockLedger;
use tracing::instrument;

use crate::draft::{OrderDraft, ShippingInfo};
use crate::error::{Result, SagaError};
use crate::order_placement::{
    SAGA_TYPE, STEP_CLEAR_CART, STEP_COLLECT_CART, STEP_PERSIST_ORDER, STEP_PRICE_ITEMS,
    STEP_RESERVE_STOCK,
};
use crate::services::{CartStore, CatalogLookup, OrderLedger};

/// What to do when the final cart-clear step fails after the order is
/// already durable and stock is deducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartClearPolicy {
    /// Compensate everything: delete the order, return the stock, and
    /// fail the placement. The cart is left as it was.
    #[default]
    RollbackOrder,

    /// Keep the placed order and leave the stale cart rows behind. The
    /// user sees their order; the cart self-corrects on next edit.
    KeepOrder,
}

/// Saga tuning knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SagaConfig {
    pub cart_clear_failure: CartClearPolicy,
}

/// One order placement request.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: UserId,
    pub shipping: ShippingInfo,
    /// Optional cutoff. Checked between steps; a deadline that passes
    /// after stock is reserved still triggers full compensation.
    pub deadline: Option<Instant>,
}

impl PlaceOrder {
    pub fn new(user_id: UserId, shipping: ShippingInfo) -> Self {
        Self {
            user_id,
            shipping,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Drives one order placement across the cart, catalog, inventory, and
/// order stores.
///
/// Forward steps run in order; on failure every completed step is
/// compensated in reverse so that no partially placed order survives.
/// The compensations themselves are best-effort: a reservation that
/// cannot be returned is logged and counted rather than retried
/// forever.
#[derive(Clone)]
pub struct OrderSagaCoordinator<L, S, C, K, O> {
    inventory: InventoryCoordinator<L, S>,
    cart: C,
    catalog: K,
    orders: O,
    config: SagaConfig,
}

impl<L, S, C, K, O> OrderSagaCoordinator<L, S, C, K, O>
where
    L: StockLedger,
    S: LockStore,
    C: CartStore,
    K: CatalogLookup,
    O: OrderLedger,
{
    pub fn new(
        inventory: InventoryCoordinator<L, S>,
        cart: C,
        catalog: K,
        orders: O,
        config: SagaConfig,
    ) -> Self {
        Self {
            inventory,
            cart,
            catalog,
            orders,
            config,
        }
    }

    /// Returns the inventory coordinator this saga reserves through.
    pub fn inventory(&self) -> &InventoryCoordinator<L, S> {
        &self.inventory
    }

    /// Places one order. On success the returned draft is `Placed` and
    /// durable; on error nothing the saga wrote survives (modulo logged
    /// release leaks).
    #[instrument(skip(self, command), fields(saga_type = SAGA_TYPE, user_id = %command.user_id))]
    pub async fn place_order(&self, command: PlaceOrder) -> Result<OrderDraft> {
        let started = Instant::now();
        metrics::counter!("order_sagas_total").increment(1);

        let result = self.run(&command).await;

        metrics::histogram!("order_saga_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        if let Err(error) = &result {
            metrics::counter!("order_sagas_failed_total").increment(1);
            tracing::warn!(user_id = %command.user_id, error = %error, "order placement failed");
        }
        result
    }

    async fn run(&self, command: &PlaceOrder) -> Result<OrderDraft> {
        // Step 1: collect the checked cart rows.
        tracing::debug!(step = STEP_COLLECT_CART, "saga step");
        let selected = self.cart.list_selected(command.user_id).await?;
        if selected.is_empty() {
            return Err(SagaError::NoItemsSelected);
        }

        // Step 2: price against the catalog.
        self.check_deadline(command)?;
        tracing::debug!(step = STEP_PRICE_ITEMS, "saga step");
        let goods_ids: Vec<_> = selected.iter().map(|item| item.goods_id).collect();
        let summaries = self.catalog.batch_get(&goods_ids).await?;
        let mut draft = OrderDraft::priced(
            command.user_id,
            command.shipping.clone(),
            &selected,
            &summaries,
        )?;

        // Step 3: reserve stock, one goods id at a time.
        self.check_deadline(command)?;
        tracing::debug!(step = STEP_RESERVE_STOCK, order_number = %draft.order_number, "saga step");
        let batch: Vec<ReservationRequest> = draft
            .items
            .iter()
            .map(|line| ReservationRequest::new(line.goods_id, line.quantity))
            .collect();
        if let Err(failure) = self.inventory.reserve(&batch).await {
            // Only the prefix that actually succeeded is returned.
            self.release_reserved(&failure.reserved).await;
            return Err(failure.error.into());
        }

        // Past this point every exit path must give the stock back.
        if command.deadline_passed() {
            self.release_reserved(&batch).await;
            return Err(SagaError::DeadlineExceeded);
        }

        // Step 4: persist the order header and lines.
        tracing::debug!(step = STEP_PERSIST_ORDER, order_number = %draft.order_number, "saga step");
        if let Err(error) = self.orders.persist(&draft).await {
            self.release_reserved(&batch).await;
            return Err(error);
        }

        // The order row exists now; a lapsed deadline must take it back
        // out along with the stock.
        if command.deadline_passed() {
            self.compensate_order(&draft, &batch).await;
            return Err(SagaError::DeadlineExceeded);
        }

        // Step 5: clear the checked cart rows.
        tracing::debug!(step = STEP_CLEAR_CART, order_number = %draft.order_number, "saga step");
        if let Err(error) = self.cart.delete_selected(command.user_id).await {
            match self.config.cart_clear_failure {
                CartClearPolicy::RollbackOrder => {
                    self.compensate_order(&draft, &batch).await;
                    return Err(error);
                }
                CartClearPolicy::KeepOrder => {
                    tracing::warn!(
                        order_number = %draft.order_number,
                        error = %error,
                        "cart clear failed; keeping placed order, cart rows are stale"
                    );
                }
            }
        }

        // Done: flip the durable status to Placed.
        if let Err(error) = self.orders.mark_placed(&draft.order_number).await {
            self.compensate_order(&draft, &batch).await;
            return Err(error);
        }
        draft.mark_placed();

        tracing::info!(
            order_number = %draft.order_number,
            user_id = %command.user_id,
            total_cents = draft.total_amount.cents(),
            lines = draft.items.len(),
            "order placed"
        );
        Ok(draft)
    }

    fn check_deadline(&self, command: &PlaceOrder) -> Result<()> {
        if command.deadline_passed() {
            return Err(SagaError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Compensation for a durable order: delete the row, then return
    /// the reserved stock.
    async fn compensate_order(&self, draft: &OrderDraft, batch: &[ReservationRequest]) {
        if let Err(error) = self.orders.remove(&draft.order_number).await {
            // The saga still fails; the orphaned Pending row needs
            // operator cleanup.
            tracing::error!(
                order_number = %draft.order_number,
                error = %error,
                "failed to remove order during compensation"
            );
        }
        self.release_reserved(batch).await;
    }

    async fn release_reserved(&self, batch: &[ReservationRequest]) {
        if batch.is_empty() {
            return;
        }
        let report = self.inventory.release(batch).await;
        if !report.is_complete() {
            tracing::error!(
                leaked = ?report.leaked,
                "compensation left reservations unreturned"
            );
        }
    }
}
