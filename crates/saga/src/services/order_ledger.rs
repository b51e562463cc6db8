//! Durable order storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{GoodsId, Money, UserId};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::draft::{OrderDraft, OrderLine, ShippingInfo};
use crate::error::{Result, SagaError};
use crate::state::OrderStatus;

/// Durable storage for order headers and lines.
///
/// `persist` writes the whole draft in one local transaction; `remove`
/// is its compensation and must be idempotent.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Writes the order header and all lines atomically.
    async fn persist(&self, draft: &OrderDraft) -> Result<()>;

    /// Flips the persisted order's status to `Placed`.
    async fn mark_placed(&self, order_number: &str) -> Result<()>;

    /// Deletes the order and its lines. Removing an order that was
    /// never persisted is a no-op.
    async fn remove(&self, order_number: &str) -> Result<()>;

    /// Fetches an order by number.
    async fn get(&self, order_number: &str) -> Result<Option<OrderDraft>>;
}

/// In-memory order ledger for tests.
#[derive(Clone, Default)]
pub struct InMemoryOrderLedger {
    orders: Arc<RwLock<HashMap<String, OrderDraft>>>,
    fail_on_persist: Arc<RwLock<bool>>,
    fail_on_mark_placed: Arc<RwLock<bool>>,
}

impl InMemoryOrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, `persist` fails with `Persistence`.
    pub async fn set_fail_on_persist(&self, fail: bool) {
        *self.fail_on_persist.write().await = fail;
    }

    /// When set, `mark_placed` fails with `Persistence`.
    pub async fn set_fail_on_mark_placed(&self, fail: bool) {
        *self.fail_on_mark_placed.write().await = fail;
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Returns true if the order number has a stored row.
    pub async fn contains(&self, order_number: &str) -> bool {
        self.orders.read().await.contains_key(order_number)
    }
}

#[async_trait]
impl OrderLedger for InMemoryOrderLedger {
    async fn persist(&self, draft: &OrderDraft) -> Result<()> {
        if *self.fail_on_persist.read().await {
            return Err(SagaError::Persistence("order store unavailable".to_string()));
        }
        self.orders
            .write()
            .await
            .insert(draft.order_number.clone(), draft.clone());
        Ok(())
    }

    async fn mark_placed(&self, order_number: &str) -> Result<()> {
        if *self.fail_on_mark_placed.read().await {
            return Err(SagaError::Persistence("order store unavailable".to_string()));
        }
        match self.orders.write().await.get_mut(order_number) {
            Some(draft) => {
                draft.mark_placed();
                Ok(())
            }
            None => Err(SagaError::Persistence(format!(
                "order {order_number} not found"
            ))),
        }
    }

    async fn remove(&self, order_number: &str) -> Result<()> {
        self.orders.write().await.remove(order_number);
        Ok(())
    }

    async fn get(&self, order_number: &str) -> Result<Option<OrderDraft>> {
        Ok(self.orders.read().await.get(order_number).cloned())
    }
}

/// PostgreSQL-backed order ledger writing `order_info` and
/// `order_goods`.
#[derive(Clone)]
pub struct PostgresOrderLedger {
    pool: PgPool,
}

impl PostgresOrderLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn persistence_error(error: sqlx::Error) -> SagaError {
    SagaError::Persistence(error.to_string())
}

#[async_trait]
impl OrderLedger for PostgresOrderLedger {
    #[instrument(skip(self, draft), fields(order_number = %draft.order_number))]
    async fn persist(&self, draft: &OrderDraft) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(persistence_error)?;

        let order_id: i64 = sqlx::query(
            r#"
            INSERT INTO order_info
                (user_id, order_sn, status, total_cents,
                 address, signer_name, signer_mobile, post,
                 add_time, update_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(draft.user_id.as_i64())
        .bind(&draft.order_number)
        .bind(draft.status.as_str())
        .bind(draft.total_amount.cents())
        .bind(&draft.shipping.address)
        .bind(&draft.shipping.signer_name)
        .bind(&draft.shipping.signer_mobile)
        .bind(&draft.shipping.post)
        .bind(draft.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(persistence_error)?
        .get("id");

        for line in &draft.items {
            sqlx::query(
                r#"
                INSERT INTO order_goods
                    (order_id, goods_id, goods_name, goods_image, price_cents, nums)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id)
            .bind(line.goods_id.as_i64())
            .bind(&line.name)
            .bind(&line.image)
            .bind(line.unit_price.cents())
            .bind(line.quantity as i32)
            .execute(&mut *tx)
            .await
            .map_err(persistence_error)?;
        }

        tx.commit().await.map_err(persistence_error)
    }

    #[instrument(skip(self))]
    async fn mark_placed(&self, order_number: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE order_info SET status = $2, update_time = NOW() WHERE order_sn = $1",
        )
        .bind(order_number)
        .bind(OrderStatus::Placed.as_str())
        .execute(&self.pool)
        .await
        .map_err(persistence_error)?;

        if result.rows_affected() == 0 {
            return Err(SagaError::Persistence(format!(
                "order {order_number} not found"
            )));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, order_number: &str) -> Result<()> {
        // order_goods rows go with the header via ON DELETE CASCADE.
        sqlx::query("DELETE FROM order_info WHERE order_sn = $1")
            .bind(order_number)
            .execute(&self.pool)
            .await
            .map_err(persistence_error)?;
        Ok(())
    }

    async fn get(&self, order_number: &str) -> Result<Option<OrderDraft>> {
        let Some(header) = sqlx::query(
            r#"
            SELECT id, user_id, order_sn, status, total_cents,
                   address, signer_name, signer_mobile, post, add_time
            FROM order_info
            WHERE order_sn = $1
            "#,
        )
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_error)?
        else {
            return Ok(None);
        };

        let order_id: i64 = header.get("id");
        let status: String = header.get("status");
        let status = status
            .parse::<OrderStatus>()
            .map_err(SagaError::Persistence)?;

        let line_rows = sqlx::query(
            r#"
            SELECT goods_id, goods_name, goods_image, price_cents, nums
            FROM order_goods
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence_error)?;

        let items = line_rows
            .into_iter()
            .map(|row| OrderLine {
                goods_id: GoodsId::new(row.get("goods_id")),
                name: row.get("goods_name"),
                image: row.get("goods_image"),
                unit_price: Money::from_cents(row.get("price_cents")),
                quantity: row.get::<i32, _>("nums").max(0) as u32,
            })
            .collect();

        Ok(Some(OrderDraft {
            order_number: header.get("order_sn"),
            user_id: UserId::new(header.get("user_id")),
            shipping: ShippingInfo {
                address: header.get("address"),
                signer_name: header.get("signer_name"),
                signer_mobile: header.get("signer_mobile"),
                post: header.get("post"),
            },
            items,
            total_amount: Money::from_cents(header.get("total_cents")),
            status,
            created_at: header.get("add_time"),
        }))
    }
}
