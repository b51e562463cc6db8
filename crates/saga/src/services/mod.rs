//! Collaborator services for the order placement saga.
//!
//! Each collaborator is a trait with a Postgres-backed or in-memory
//! implementation. The in-memory versions carry failure toggles so
//! tests can force any step of the saga to fail deterministically.

pub mod cart;
pub mod catalog;
pub mod order_ledger;

pub use cart::{CartItem, CartStore, InMemoryCartStore};
pub use catalog::{CatalogLookup, GoodsSummary, InMemoryCatalog};
pub use order_ledger::{InMemoryOrderLedger, OrderLedger, PostgresOrderLedger};
