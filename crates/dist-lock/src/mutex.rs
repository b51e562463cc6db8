//! Distributed mutex over a shared lock store.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::error::{LockError, Result};
use crate::store::LockStore;

/// Acquisition parameters for the mutex.
#[derive(Debug, Clone, Copy)]
pub struct MutexConfig {
    /// How long a claim stays valid if never released. Must be generous
    /// relative to the guarded operation: the ledger write is not fenced
    /// against an expired lease.
    pub lease_duration: Duration,
    /// Total acquisition attempts before giving up.
    pub max_retries: u32,
    /// Sleep between acquisition attempts.
    pub retry_delay: Duration,
}

impl Default for MutexConfig {
    fn default() -> Self {
        Self {
            lease_duration: Duration::from_secs(10),
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
        }
    }
}

/// Proof of a held claim, returned by [`DistributedMutex::acquire`].
///
/// Owned by the call that acquired it; not persisted beyond that call.
#[derive(Debug, Clone)]
pub struct LockHandle {
    key: String,
    owner: Uuid,
    expires_at: Instant,
}

impl LockHandle {
    /// The locked key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The owner token distinguishing this holder.
    pub fn owner(&self) -> Uuid {
        self.owner
    }

    /// When the lease expires if not released.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

/// Per-key mutual exclusion primitive backed by a shared store.
#[derive(Clone)]
pub struct DistributedMutex<S> {
    store: S,
    config: MutexConfig,
}

impl<S: LockStore> DistributedMutex<S> {
    /// Creates a mutex over the given store with the given config.
    pub fn new(store: S, config: MutexConfig) -> Self {
        Self { store, config }
    }

    /// Returns the configured acquisition parameters.
    pub fn config(&self) -> MutexConfig {
        self.config
    }

    /// Acquires the lock for `key` within the configured retry budget.
    pub async fn acquire(&self, key: &str) -> Result<LockHandle> {
        self.acquire_with_budget(key, self.config.max_retries, self.config.retry_delay)
            .await
    }

    /// Acquires the lock for `key` with an explicit retry budget.
    ///
    /// Used by compensation paths that should wait longer than a normal
    /// acquisition before declaring the key unavailable.
    pub async fn acquire_with_budget(
        &self,
        key: &str,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Result<LockHandle> {
        let owner = Uuid::new_v4();
        let attempts = max_retries.max(1);

        for attempt in 1..=attempts {
            if self
                .store
                .try_acquire(key, owner, self.config.lease_duration)
                .await?
            {
                return Ok(LockHandle {
                    key: key.to_string(),
                    owner,
                    expires_at: Instant::now() + self.config.lease_duration,
                });
            }

            if attempt < attempts {
                metrics::counter!("lock_acquire_retries_total").increment(1);
                tokio::time::sleep(retry_delay).await;
            }
        }

        tracing::warn!(key, attempts, "lock unavailable after retry budget");
        Err(LockError::Unavailable {
            key: key.to_string(),
            attempts,
        })
    }

    /// Releases a held lock, best-effort.
    ///
    /// A failed release is logged and the lease is left to expire on its
    /// own. A release that finds the claim already gone means the lease
    /// expired while held; this is counted so operators can see when the
    /// lease duration is too tight for the guarded operation.
    pub async fn release(&self, handle: LockHandle) {
        match self.store.release(&handle.key, handle.owner).await {
            Ok(true) => {}
            Ok(false) => {
                metrics::counter!("lock_expired_during_hold_total").increment(1);
                tracing::warn!(key = %handle.key, "lease expired before release");
            }
            Err(e) => {
                tracing::warn!(key = %handle.key, error = %e, "failed to release lock, lease will expire");
            }
        }
    }
}
