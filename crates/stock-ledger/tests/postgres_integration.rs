//! PostgreSQL integration tests for the stock ledger.
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p stock-ledger --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use serial_test::serial;
use sqlx::PgPool;
use stock_ledger::{GoodsId, PostgresStockLedger, Revision, StockLedger, StockLedgerError};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_stock_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh ledger with its own pool and cleared tables
async fn get_test_ledger() -> PostgresStockLedger {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE stock, stock_locks")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStockLedger::new(pool)
}

#[tokio::test]
#[serial]
async fn put_then_get_roundtrip() {
    let ledger = get_test_ledger().await;
    let goods = GoodsId::new(100);

    let created = ledger.put(goods, 25).await.unwrap();
    assert_eq!(created.quantity, 25);
    assert_eq!(created.revision, Revision::first());

    let fetched = ledger.get(goods).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
#[serial]
async fn get_missing_goods_is_not_found() {
    let ledger = get_test_ledger().await;

    let result = ledger.get(GoodsId::new(404)).await;
    assert!(matches!(result, Err(StockLedgerError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn put_resets_quantity_and_bumps_revision() {
    let ledger = get_test_ledger().await;
    let goods = GoodsId::new(101);

    ledger.put(goods, 25).await.unwrap();
    let reset = ledger.put(goods, 5).await.unwrap();

    assert_eq!(reset.quantity, 5);
    assert_eq!(reset.revision, Revision::new(2));
}

#[tokio::test]
#[serial]
async fn compare_and_set_with_current_revision_succeeds() {
    let ledger = get_test_ledger().await;
    let goods = GoodsId::new(102);
    let record = ledger.put(goods, 10).await.unwrap();

    let updated = ledger
        .compare_and_set(goods, record.revision, 7)
        .await
        .unwrap();

    assert_eq!(updated.quantity, 7);
    assert_eq!(updated.revision, record.revision.next());
}

#[tokio::test]
#[serial]
async fn compare_and_set_with_stale_revision_conflicts() {
    let ledger = get_test_ledger().await;
    let goods = GoodsId::new(103);
    let record = ledger.put(goods, 10).await.unwrap();

    ledger
        .compare_and_set(goods, record.revision, 7)
        .await
        .unwrap();

    let result = ledger.compare_and_set(goods, record.revision, 3).await;
    assert!(matches!(
        result,
        Err(StockLedgerError::RevisionConflict { .. })
    ));

    // The failed write must not have touched the quantity
    let current = ledger.get(goods).await.unwrap();
    assert_eq!(current.quantity, 7);
}

#[tokio::test]
#[serial]
async fn compare_and_set_missing_goods_is_not_found() {
    let ledger = get_test_ledger().await;

    let result = ledger
        .compare_and_set(GoodsId::new(405), Revision::first(), 1)
        .await;
    assert!(matches!(result, Err(StockLedgerError::NotFound(_))));
}
