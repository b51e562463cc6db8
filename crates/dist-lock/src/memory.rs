use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;
use crate::store::LockStore;

#[derive(Debug, Clone, Copy)]
struct Claim {
    owner: Uuid,
    expires_at: Instant,
}

/// In-memory lock store implementation for testing.
///
/// Provides the same claim-until-lease-expiry semantics as the
/// PostgreSQL implementation, scoped to one process.
#[derive(Clone, Default)]
pub struct InMemoryLockStore {
    claims: Arc<Mutex<HashMap<String, Claim>>>,
}

impl InMemoryLockStore {
    /// Creates a new empty lock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if an unexpired claim exists for `key`.
    pub async fn is_held(&self, key: &str) -> bool {
        let claims = self.claims.lock().await;
        claims
            .get(key)
            .is_some_and(|c| c.expires_at > Instant::now())
    }

    /// Expires the claim on `key` immediately, simulating lease timeout.
    pub async fn force_expire(&self, key: &str) {
        let mut claims = self.claims.lock().await;
        if let Some(claim) = claims.get_mut(key) {
            claim.expires_at = Instant::now();
        }
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn try_acquire(&self, key: &str, owner: Uuid, lease: Duration) -> Result<bool> {
        let mut claims = self.claims.lock().await;
        let now = Instant::now();

        if let Some(existing) = claims.get(key)
            && existing.expires_at > now
        {
            return Ok(false);
        }

        claims.insert(
            key.to_string(),
            Claim {
                owner,
                expires_at: now + lease,
            },
        );
        Ok(true)
    }

    async fn release(&self, key: &str, owner: Uuid) -> Result<bool> {
        let mut claims = self.claims.lock().await;
        let now = Instant::now();

        match claims.get(key) {
            Some(claim) if claim.owner == owner && claim.expires_at > now => {
                claims.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEASE: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn acquire_then_release() {
        let store = InMemoryLockStore::new();
        let owner = Uuid::new_v4();

        assert!(store.try_acquire("k", owner, LEASE).await.unwrap());
        assert!(store.is_held("k").await);

        assert!(store.release("k", owner).await.unwrap());
        assert!(!store.is_held("k").await);
    }

    #[tokio::test]
    async fn second_owner_is_rejected_while_held() {
        let store = InMemoryLockStore::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(store.try_acquire("k", first, LEASE).await.unwrap());
        assert!(!store.try_acquire("k", second, LEASE).await.unwrap());
    }

    #[tokio::test]
    async fn expired_claim_can_be_reacquired() {
        let store = InMemoryLockStore::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(store.try_acquire("k", first, LEASE).await.unwrap());
        store.force_expire("k").await;

        assert!(store.try_acquire("k", second, LEASE).await.unwrap());
    }

    #[tokio::test]
    async fn release_after_expiry_reports_lost_claim() {
        let store = InMemoryLockStore::new();
        let owner = Uuid::new_v4();

        assert!(store.try_acquire("k", owner, LEASE).await.unwrap());
        store.force_expire("k").await;

        assert!(!store.release("k", owner).await.unwrap());
    }

    #[tokio::test]
    async fn release_by_non_owner_is_rejected() {
        let store = InMemoryLockStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(store.try_acquire("k", owner, LEASE).await.unwrap());
        assert!(!store.release("k", other).await.unwrap());
        assert!(store.is_held("k").await);
    }
}
