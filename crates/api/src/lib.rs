//! HTTP API server for order placement and inventory management.
//!
//! Exposes the order saga and the inventory coordinator over REST, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use dist_lock::{DistributedMutex, LockStore};
use inventory::InventoryCoordinator;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{InMemoryCartStore, InMemoryCatalog, OrderLedger, OrderSagaCoordinator};
use stock_ledger::StockLedger;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<L, S, O>(
    state: Arc<AppState<L, S, O>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    L: StockLedger + Clone + 'static,
    S: LockStore + Clone + 'static,
    O: OrderLedger + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<L, S, O>))
        .route("/orders/{order_number}", get(routes::orders::get::<L, S, O>))
        .route("/inventory/reserve", post(routes::inventory::reserve::<L, S, O>))
        .route("/inventory/release", post(routes::inventory::release::<L, S, O>))
        .route(
            "/inventory/{goods_id}",
            get(routes::inventory::get::<L, S, O>).put(routes::inventory::set::<L, S, O>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over the given ledger, lock store, and
/// order ledger, with in-memory cart and catalog stand-ins.
pub fn create_state<L, S, O>(ledger: L, lock_store: S, orders: O, config: &Config) -> Arc<AppState<L, S, O>>
where
    L: StockLedger + Clone + 'static,
    S: LockStore + Clone + 'static,
    O: OrderLedger + Clone + 'static,
{
    let mutex = DistributedMutex::new(lock_store, config.mutex_config());
    let inventory = InventoryCoordinator::new(ledger, mutex);
    let cart = InMemoryCartStore::new();
    let catalog = InMemoryCatalog::new();
    let saga = OrderSagaCoordinator::new(
        inventory,
        cart.clone(),
        catalog.clone(),
        orders.clone(),
        config.saga_config(),
    );

    Arc::new(AppState {
        saga,
        orders,
        cart,
        catalog,
    })
}
