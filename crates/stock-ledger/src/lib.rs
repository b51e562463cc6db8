//! Durable per-goods stock counter.
//!
//! The ledger stores one [`StockRecord`] per goods id with a monotonically
//! advancing revision. It has no concurrency control of its own: all
//! mutation is expected to be serialized externally by a per-goods lock.
//! [`StockLedger::compare_and_set`] is retained as a defensive check —
//! a revision conflict means a lock-correctness bug, not a retry case.

pub mod error;
pub mod ledger;
pub mod memory;
pub mod postgres;
pub mod record;

pub use common::GoodsId;
pub use error::{Result, StockLedgerError};
pub use ledger::StockLedger;
pub use memory::InMemoryStockLedger;
pub use postgres::PostgresStockLedger;
pub use record::{Revision, StockRecord};
