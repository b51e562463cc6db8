//! Order placement saga.
//!
//! Order placement spans three independent stores — cart, stock ledger,
//! and order ledger — with no distributed transaction. The coordinator
//! drives the forward steps:
//!
//! 1. Collect the user's checked cart items
//! 2. Price them against the catalog
//! 3. Reserve stock (per-goods distributed lock)
//! 4. Persist the order header and lines in one local transaction
//! 5. Clear the checked cart rows
//!
//! and compensates backward on failure: released reservations, deleted
//! order rows. An order is either fully placed or not present at all.

pub mod coordinator;
pub mod draft;
pub mod error;
pub mod order_placement;
pub mod services;
pub mod state;

pub use coordinator::{CartClearPolicy, OrderSagaCoordinator, PlaceOrder, SagaConfig};
pub use draft::{OrderDraft, OrderLine, ShippingInfo};
pub use error::SagaError;
pub use services::{
    CartItem, CartStore, CatalogLookup, GoodsSummary, InMemoryCartStore, InMemoryCatalog,
    InMemoryOrderLedger, OrderLedger, PostgresOrderLedger,
};
pub use state::OrderStatus;
