//! Shared lock store capability.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

/// A shared store that can claim a key for a bounded lease.
///
/// Implementations must be safe under concurrent callers from many
/// processes: at most one owner holds an unexpired claim on a key.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Attempts to claim `key` for `owner` until `lease` elapses.
    ///
    /// Returns `true` if the claim succeeded, `false` if another owner
    /// holds an unexpired claim. Never blocks waiting for the key.
    async fn try_acquire(&self, key: &str, owner: Uuid, lease: Duration) -> Result<bool>;

    /// Releases the claim on `key` if `owner` still holds it.
    ///
    /// Returns `false` when the claim was already gone — the lease
    /// expired while held, or another owner has since claimed the key.
    async fn release(&self, key: &str, owner: Uuid) -> Result<bool>;
}
