//! Stock reservation under concurrent access.
//!
//! The [`InventoryCoordinator`] is the only writer of the stock ledger.
//! Every mutation of a goods id's quantity happens while that id's
//! distributed lock is held, one lock per goods id, acquired and released
//! independently for each id in a batch.
//!
//! `reserve` is not atomic across a batch: when it fails partway, the
//! error carries the prefix of requests that already succeeded so the
//! caller can release exactly those. `release` is the compensating
//! increment and is deliberately more patient than `reserve` — a stuck
//! release leaves the system under-stocked rather than over-sold.

pub mod batch;
pub mod coordinator;
pub mod error;

pub use batch::ReservationRequest;
pub use coordinator::{InventoryCoordinator, ReleaseReport};
pub use error::{InventoryError, ReserveFailure, Result};
