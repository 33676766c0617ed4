//! `stockroom-ledger` — pure ledger domain types.
//!
//! The movement entry record, its type/status enums, and the reversal
//! algebra. No I/O lives here; persistence and orchestration are in
//! `stockroom-infra`.

pub mod movement;

pub use movement::{
    reversal_remarks, void_annotation, Movement, MovementPatch, MovementStatus, MovementType,
    NewMovement, StockDirection,
};
