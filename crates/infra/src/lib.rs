//! Infrastructure layer: persistence backends and ledger orchestration.
//!
//! This crate contains no domain decisions of its own. It composes the pure
//! domain crates with a backing store behind the `InventoryStore`/`StoreTx`
//! traits and exposes the `LedgerService` unit-of-work orchestration on top.

pub mod ledger;
pub mod store;

pub use ledger::{
    AmendMovement, LedgerService, MovementDetail, MovementRecord, ProductSnapshot, RecordMovement,
    VoidOutcome,
};
pub use store::memory::InMemoryStore;
pub use store::postgres::PostgresStore;
pub use store::{InventoryStore, StoreError, StoreTx};
