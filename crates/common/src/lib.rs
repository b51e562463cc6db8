//! Shared types for the storefront order core.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{GoodsId, UserId};
