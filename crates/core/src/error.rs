//! Domain error model.

use thiserror::Error;

use crate::id::{MovementId, ProductId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business/domain failures (validation,
/// guard rejections, stock shortfalls). Infrastructure failures are folded
/// into `Unknown` at the service boundary; the transaction scope guarantees
/// they left no partial effect behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Movement type not in the permitted set; rejected before any store access.
    #[error("invalid transaction type: {0}")]
    InvalidMovementType(String),

    /// Movement quantity must be strictly positive; rejected before any store access.
    #[error("quantity must be greater than 0 (got {0})")]
    InvalidQuantity(i64),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced product or movement entry does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A decreasing adjustment would drive the stock quantity negative.
    /// The enclosing transaction rolls back entirely; no entry is written.
    #[error("insufficient inventory for product #{product_id}: {on_hand} on hand, {requested} requested")]
    InsufficientInventory {
        product_id: ProductId,
        on_hand: i64,
        requested: i64,
    },

    /// The movement has already been voided; a second void or an amendment
    /// is rejected without mutation.
    #[error("transaction #{0} has already been voided")]
    AlreadyVoided(MovementId),

    /// Reversal entries are terminal: they can be neither voided nor amended.
    #[error("transaction #{0} is a reversal and cannot be voided or amended")]
    ReversalImmutable(MovementId),

    /// Unexpected store/transport failure, surfaced with the underlying
    /// message. Safe to retry: the transaction committed nothing.
    #[error("store failure: {0}")]
    Unknown(String),
}

impl DomainError {
    pub fn invalid_movement_type(raw: impl Into<String>) -> Self {
        Self::InvalidMovementType(raw.into())
    }

    pub fn invalid_quantity(quantity: i64) -> Self {
        Self::InvalidQuantity(quantity)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn product_not_found(id: ProductId) -> Self {
        Self::NotFound(format!("product #{id}"))
    }

    pub fn movement_not_found(id: MovementId) -> Self {
        Self::NotFound(format!("transaction #{id}"))
    }

    pub fn insufficient_inventory(product_id: ProductId, on_hand: i64, requested: i64) -> Self {
        Self::InsufficientInventory {
            product_id,
            on_hand,
            requested,
        }
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }
}
