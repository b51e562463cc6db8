//! Per-key mutual exclusion across process instances.
//!
//! A [`DistributedMutex`] serializes writers of a shared resource (here:
//! one stock counter per goods id) through a [`LockStore`] — any shared
//! store that can conditionally claim a key for a bounded lease.
//!
//! Leases make acquisition crash-safe: if a holder dies without releasing,
//! the key frees itself after the lease duration. The ledger write is not
//! fenced against an expired lease, so the lease must stay generous
//! relative to the guarded operation; `release` reports expiry-during-hold
//! through the `lock_expired_during_hold` counter so the condition is
//! observable.

pub mod error;
pub mod memory;
pub mod mutex;
pub mod postgres;
pub mod store;

pub use error::{LockError, Result};
pub use memory::InMemoryLockStore;
pub use mutex::{DistributedMutex, LockHandle, MutexConfig};
pub use postgres::PostgresLockStore;
pub use store::LockStore;
