//! PostgreSQL integration tests for the order ledger.
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p saga --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{GoodsId, Money, UserId};
use saga::{
    CartItem, GoodsSummary, OrderDraft, OrderLedger, OrderStatus, PostgresOrderLedger, SagaError,
    ShippingInfo,
};
use serial_test::serial;
use sqlx::{PgPool, Row};
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
                "../../../migrations/002_create_order_tables.sql"
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
async fn get_test_ledger() -> (PostgresOrderLedger, PgPool) {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_info, order_goods")
        .execute(&pool)
        .await
        .unwrap();

    (PostgresOrderLedger::new(pool.clone()), pool)
}

fn sample_draft(user: i64) -> OrderDraft {
    let selected = vec![
        CartItem::new(GoodsId::new(1), 2),
        CartItem::new(GoodsId::new(2), 1),
    ];
    let summaries = vec![
        GoodsSummary {
            goods_id: GoodsId::new(1),
            name: "widget".to_string(),
            front_image: "https://img.example/1.png".to_string(),
            shop_price: Money::from_cents(400),
        },
        GoodsSummary {
            goods_id: GoodsId::new(2),
            name: "gadget".to_string(),
            front_image: String::new(),
            shop_price: Money::from_cents(150),
        },
    ];
    let shipping = ShippingInfo {
        address: "1 Example Way".to_string(),
        signer_name: "A. Customer".to_string(),
        signer_mobile: "555-0100".to_string(),
        post: "ring bell".to_string(),
    };
    OrderDraft::priced(UserId::new(user), shipping, &selected, &summaries).unwrap()
}

async fn line_count(pool: &PgPool) -> i64 {
    sqlx::query("SELECT count(*) AS n FROM order_goods")
        .fetch_one(pool)
        .await
        .unwrap()
        .get("n")
}

#[tokio::test]
#[serial]
async fn persist_then_get_roundtrips_header_and_lines() {
    let (ledger, _pool) = get_test_ledger().await;
    let draft = sample_draft(5);

    ledger.persist(&draft).await.unwrap();

    let stored = ledger.get(&draft.order_number).await.unwrap().unwrap();
    assert_eq!(stored.order_number, draft.order_number);
    assert_eq!(stored.user_id, draft.user_id);
    assert_eq!(stored.shipping, draft.shipping);
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.total_amount, Money::from_cents(2 * 400 + 150));

    // Lines come back in insertion order with denormalized fields
    assert_eq!(stored.items.len(), 2);
    assert_eq!(stored.items[0].name, "widget");
    assert_eq!(stored.items[0].quantity, 2);
    assert_eq!(stored.items[0].unit_price, Money::from_cents(400));
    assert_eq!(stored.items[1].goods_id, GoodsId::new(2));
}

#[tokio::test]
#[serial]
async fn get_unknown_order_is_none() {
    let (ledger, _pool) = get_test_ledger().await;

    assert!(ledger.get("20990101000000").await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn mark_placed_flips_durable_status() {
    let (ledger, _pool) = get_test_ledger().await;
    let draft = sample_draft(5);
    ledger.persist(&draft).await.unwrap();

    ledger.mark_placed(&draft.order_number).await.unwrap();

    let stored = ledger.get(&draft.order_number).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Placed);
}

#[tokio::test]
#[serial]
async fn mark_placed_unknown_order_fails() {
    let (ledger, _pool) = get_test_ledger().await;

    let result = ledger.mark_placed("20990101000000").await;
    assert!(matches!(result, Err(SagaError::Persistence(_))));
}

#[tokio::test]
#[serial]
async fn remove_cascades_to_lines_and_is_idempotent() {
    let (ledger, pool) = get_test_ledger().await;
    let draft = sample_draft(5);
    ledger.persist(&draft).await.unwrap();
    assert_eq!(line_count(&pool).await, 2);

    ledger.remove(&draft.order_number).await.unwrap();

    assert!(ledger.get(&draft.order_number).await.unwrap().is_none());
    assert_eq!(line_count(&pool).await, 0);

    // Removing an already-removed order is a no-op
    ledger.remove(&draft.order_number).await.unwrap();
}

#[tokio::test]
#[serial]
async fn orders_for_different_users_do_not_interfere() {
    let (ledger, pool) = get_test_ledger().await;
    let first = sample_draft(1);
    let second = sample_draft(2);
    ledger.persist(&first).await.unwrap();
    ledger.persist(&second).await.unwrap();

    ledger.remove(&first.order_number).await.unwrap();

    let stored = ledger.get(&second.order_number).await.unwrap().unwrap();
    assert_eq!(stored.user_id, UserId::new(2));
    assert_eq!(line_count(&pool).await, 2);
}
