//! Order placement and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::UserId;
use dist_lock::LockStore;
use saga::{
    InMemoryCartStore, InMemoryCatalog, OrderDraft, OrderLedger, OrderSagaCoordinator, PlaceOrder,
    ShippingInfo,
};
use serde::{Deserialize, Serialize};
use stock_ledger::StockLedger;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
///
/// The cart and catalog are in-memory stand-ins for their upstream
/// services; the stock ledger, lock store, and order ledger are
/// pluggable so the Postgres implementations can be wired in.
pub struct AppState<L, S, O>
where
    L: StockLedger,
    S: LockStore,
{
    pub saga: OrderSagaCoordinator<L, S, InMemoryCartStore, InMemoryCatalog, O>,
    pub orders: O,
    pub cart: InMemoryCartStore,
    pub catalog: InMemoryCatalog,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: i64,
    pub address: String,
    pub signer_name: String,
    pub signer_mobile: String,
    #[serde(default)]
    pub post: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_number: String,
    pub user_id: i64,
    pub status: String,
    pub total_cents: i64,
    pub items: Vec<OrderLineResponse>,
}

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub goods_id: i64,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl From<OrderDraft> for OrderResponse {
    fn from(draft: OrderDraft) -> Self {
        OrderResponse {
            order_number: draft.order_number,
            user_id: draft.user_id.as_i64(),
            status: draft.status.to_string(),
            total_cents: draft.total_amount.cents(),
            items: draft
                .items
                .into_iter()
                .map(|line| OrderLineResponse {
                    goods_id: line.goods_id.as_i64(),
                    name: line.name,
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price.cents(),
                })
                .collect(),
        }
    }
}

// -- Handlers --

/// POST /orders — place an order from the user's checked cart rows.
#[tracing::instrument(skip(state, req), fields(user_id = req.user_id))]
pub async fn create<L, S, O>(
    State(state): State<Arc<AppState<L, S, O>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError>
where
    L: StockLedger + Clone + 'static,
    S: LockStore + Clone + 'static,
    O: OrderLedger + Clone + 'static,
{
    let command = PlaceOrder::new(
        UserId::new(req.user_id),
        ShippingInfo {
            address: req.address,
            signer_name: req.signer_name,
            signer_mobile: req.signer_mobile,
            post: req.post,
        },
    );

    let draft = state.saga.place_order(command).await?;
    Ok((axum::http::StatusCode::CREATED, Json(draft.into())))
}

/// GET /orders/{order_number} — load a placed order.
#[tracing::instrument(skip(state))]
pub async fn get<L, S, O>(
    State(state): State<Arc<AppState<L, S, O>>>,
    Path(order_number): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    L: StockLedger + Clone + 'static,
    S: LockStore + Clone + 'static,
    O: OrderLedger + Clone + 'static,
{
    let draft = state
        .orders
        .get(&order_number)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_number} not found")))?;

    Ok(Json(draft.into()))
}
