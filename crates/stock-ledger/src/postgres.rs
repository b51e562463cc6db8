use async_trait::async_trait;
use common::GoodsId;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{Result, StockLedgerError};
use crate::ledger::StockLedger;
use crate::record::{Revision, StockRecord};

/// PostgreSQL-backed stock ledger implementation.
#[derive(Clone)]
pub struct PostgresStockLedger {
    pool: PgPool,
}

impl PostgresStockLedger {
    /// Creates a new PostgreSQL stock ledger.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_record(row: PgRow) -> Result<StockRecord> {
        let quantity: i64 = row.try_get("quantity")?;
        Ok(StockRecord {
            goods_id: GoodsId::new(row.try_get("goods_id")?),
            quantity: quantity.max(0) as u32,
            revision: Revision::new(row.try_get("revision")?),
        })
    }
}

#[async_trait]
impl StockLedger for PostgresStockLedger {
    async fn get(&self, goods_id: GoodsId) -> Result<StockRecord> {
        let row = sqlx::query(
            r#"
            SELECT goods_id, quantity, revision
            FROM stock
            WHERE goods_id = $1
            "#,
        )
        .bind(goods_id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StockLedgerError::NotFound(goods_id))?;

        Self::row_to_record(row)
    }

    async fn compare_and_set(
        &self,
        goods_id: GoodsId,
        expected: Revision,
        new_quantity: u32,
    ) -> Result<StockRecord> {
        let row = sqlx::query(
            r#"
            UPDATE stock
            SET quantity = $3, revision = revision + 1, updated_at = now()
            WHERE goods_id = $1 AND revision = $2
            RETURNING goods_id, quantity, revision
            "#,
        )
        .bind(goods_id.as_i64())
        .bind(expected.as_i64())
        .bind(i64::from(new_quantity))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_record(row),
            // No row matched: either the goods is unknown or the revision
            // is stale. Re-read to tell the two apart.
            None => {
                let current = self.get(goods_id).await?;
                Err(StockLedgerError::RevisionConflict {
                    goods_id,
                    expected,
                    actual: current.revision,
                })
            }
        }
    }

    async fn put(&self, goods_id: GoodsId, quantity: u32) -> Result<StockRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO stock (goods_id, quantity, revision, updated_at)
            VALUES ($1, $2, 1, now())
            ON CONFLICT (goods_id)
            DO UPDATE SET quantity = $2, revision = stock.revision + 1, updated_at = now()
            RETURNING goods_id, quantity, revision
            "#,
        )
        .bind(goods_id.as_i64())
        .bind(i64::from(quantity))
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_record(row)
    }
}
