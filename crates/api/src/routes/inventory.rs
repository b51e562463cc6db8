//! Stock query, provisioning, and reserve/release endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::GoodsId;
use dist_lock::LockStore;
use inventory::ReservationRequest;
use saga::OrderLedger;
use serde::{Deserialize, Serialize};
use stock_ledger::{StockLedger, StockRecord};

use crate::error::ApiError;
use crate::routes::orders::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct SetStockRequest {
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub items: Vec<BatchItem>,
}

#[derive(Deserialize)]
pub struct BatchItem {
    pub goods_id: i64,
    pub quantity: u32,
}

impl BatchRequest {
    fn to_requests(&self) -> Vec<ReservationRequest> {
        self.items
            .iter()
            .map(|item| ReservationRequest::new(GoodsId::new(item.goods_id), item.quantity))
            .collect()
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct StockResponse {
    pub goods_id: i64,
    pub quantity: u32,
    pub revision: i64,
}

impl From<StockRecord> for StockResponse {
    fn from(record: StockRecord) -> Self {
        StockResponse {
            goods_id: record.goods_id.as_i64(),
            quantity: record.quantity,
            revision: record.revision.as_i64(),
        }
    }
}

#[derive(Serialize)]
pub struct ReserveResponse {
    pub reserved: usize,
}

#[derive(Serialize)]
pub struct ReleaseResponse {
    pub leaked: Vec<i64>,
}

// -- Handlers --

/// GET /inventory/{goods_id} — read the current stock record.
#[tracing::instrument(skip(state))]
pub async fn get<L, S, O>(
    State(state): State<Arc<AppState<L, S, O>>>,
    Path(goods_id): Path<i64>,
) -> Result<Json<StockResponse>, ApiError>
where
    L: StockLedger + Clone + 'static,
    S: LockStore + Clone + 'static,
    O: OrderLedger + Clone + 'static,
{
    let record = state
        .saga
        .inventory()
        .stock_of(GoodsId::new(goods_id))
        .await?;
    Ok(Json(record.into()))
}

/// PUT /inventory/{goods_id} — provision or reset a stock level.
#[tracing::instrument(skip(state, req))]
pub async fn set<L, S, O>(
    State(state): State<Arc<AppState<L, S, O>>>,
    Path(goods_id): Path<i64>,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<StockResponse>, ApiError>
where
    L: StockLedger + Clone + 'static,
    S: LockStore + Clone + 'static,
    O: OrderLedger + Clone + 'static,
{
    let record = state
        .saga
        .inventory()
        .set_stock(GoodsId::new(goods_id), req.quantity)
        .await?;
    Ok(Json(record.into()))
}

/// POST /inventory/reserve — reserve stock for a batch of goods.
///
/// The coordinator stops at the first failing id; this handler returns
/// any already-reserved prefix before reporting the error, so the call
/// is all-or-nothing from the client's point of view.
#[tracing::instrument(skip(state, req))]
pub async fn reserve<L, S, O>(
    State(state): State<Arc<AppState<L, S, O>>>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<ReserveResponse>, ApiError>
where
    L: StockLedger + Clone + 'static,
    S: LockStore + Clone + 'static,
    O: OrderLedger + Clone + 'static,
{
    let batch = req.to_requests();
    if let Err(failure) = state.saga.inventory().reserve(&batch).await {
        if !failure.reserved.is_empty() {
            state.saga.inventory().release(&failure.reserved).await;
        }
        return Err(failure.error.into());
    }
    Ok(Json(ReserveResponse {
        reserved: batch.len(),
    }))
}

/// POST /inventory/release — return previously reserved stock.
#[tracing::instrument(skip(state, req))]
pub async fn release<L, S, O>(
    State(state): State<Arc<AppState<L, S, O>>>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<ReleaseResponse>, ApiError>
where
    L: StockLedger + Clone + 'static,
    S: LockStore + Clone + 'static,
    O: OrderLedger + Clone + 'static,
{
    let report = state.saga.inventory().release(&req.to_requests()).await;
    Ok(Json(ReleaseResponse {
        leaked: report.leaked.iter().map(|id| id.as_i64()).collect(),
    }))
}
