//! Store traits: the persistence interface the ledger consumes.
//!
//! Two seams, modeled after the scoped-unit-of-work shape:
//!
//! - [`InventoryStore`] is the long-lived handle: catalog CRUD, the ledger
//!   read side, and `begin()` to open a transaction scope.
//! - [`StoreTx`] is one atomic transaction. Every read and write of a
//!   single ledger operation goes through one `StoreTx`; reads observe the
//!   transaction's own prior writes, `commit()` publishes everything
//!   all-or-nothing, and dropping the handle without committing discards
//!   every staged write.
//!
//! Handlers may run concurrently, but a `StoreTx` must never interleave
//! steps of two ledger operations: one operation, one transaction.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{CategoryId, MovementId, ProductId};
use stockroom_ledger::{Movement, MovementPatch, NewMovement};
use stockroom_products::{Category, NewCategory, NewProduct, Product, ProductPatch};

/// Infrastructure-level store failure. Deterministic business failures
/// never surface here; they are decided above the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl StoreError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Transaction-scoped store handle (one atomic unit of work).
#[async_trait]
pub trait StoreTx: Send {
    /// Fetch a product row, holding it against concurrent writers until the
    /// transaction ends. Reads reflect this transaction's prior writes.
    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Persist a new stock quantity, refreshing the product's last-modified
    /// timestamp.
    async fn set_product_quantity(
        &mut self,
        id: ProductId,
        quantity: i64,
    ) -> Result<(), StoreError>;

    async fn movement(&mut self, id: MovementId) -> Result<Option<Movement>, StoreError>;

    /// Append a ledger entry; the store assigns id and timestamp.
    async fn insert_movement(&mut self, new: NewMovement) -> Result<Movement, StoreError>;

    /// Patch an entry in place. The row must exist (callers load it first
    /// inside the same transaction).
    async fn update_movement(
        &mut self,
        id: MovementId,
        patch: MovementPatch,
    ) -> Result<Movement, StoreError>;

    /// Commit every staged write atomically.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Backing store: catalog CRUD, ledger read side, and the entrypoint into
/// the transactional write side.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Open a new atomic transaction scope.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;

    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError>;

    /// All ledger entries, newest first (timestamp descending, id breaking
    /// ties).
    async fn movements(&self) -> Result<Vec<Movement>, StoreError>;

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All products, id ascending.
    async fn products(&self) -> Result<Vec<Product>, StoreError>;

    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError>;

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError>;

    /// Remove a product row. Returns whether a row existed.
    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Whether any ledger entry references the product (referenced products
    /// must not be deleted).
    async fn product_has_movements(&self, id: ProductId) -> Result<bool, StoreError>;

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    async fn categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError>;
}
