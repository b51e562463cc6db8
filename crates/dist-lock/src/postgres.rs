use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::store::LockStore;

/// PostgreSQL-backed lock store implementation.
///
/// Claims live in the `stock_locks` table; an insert claims a free key
/// and a conditional upsert takes over a key whose lease has expired.
/// Timestamps are compared on the database clock so all processes agree
/// on expiry.
#[derive(Clone)]
pub struct PostgresLockStore {
    pool: PgPool,
}

impl PostgresLockStore {
    /// Creates a new PostgreSQL lock store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockStore for PostgresLockStore {
    async fn try_acquire(&self, key: &str, owner: Uuid, lease: Duration) -> Result<bool> {
        let row = sqlx::query(
            r#"
            INSERT INTO stock_locks (lock_key, owner, expires_at)
            VALUES ($1, $2, now() + make_interval(secs => $3))
            ON CONFLICT (lock_key) DO UPDATE
                SET owner = $2, expires_at = now() + make_interval(secs => $3)
                WHERE stock_locks.expires_at <= now()
            RETURNING owner
            "#,
        )
        .bind(key)
        .bind(owner)
        .bind(lease.as_secs_f64())
        .fetch_optional(&self.pool)
        .await?;

        // No row returned means the conflict branch was skipped: another
        // owner still holds an unexpired claim.
        Ok(row.is_some_and(|r| r.try_get::<Uuid, _>("owner").is_ok_and(|o| o == owner)))
    }

    async fn release(&self, key: &str, owner: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM stock_locks
            WHERE lock_key = $1 AND owner = $2 AND expires_at > now()
            "#,
        )
        .bind(key)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
