//! Lock error types.

use thiserror::Error;

/// Errors that can occur during lock operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock could not be acquired within the retry budget.
    #[error("lock '{key}' unavailable after {attempts} attempts")]
    Unavailable { key: String, attempts: u32 },

    /// The backing lock store failed.
    #[error("lock store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Convenience type alias for lock results.
pub type Result<T> = std::result::Result<T, LockError>;
