//! Ledger operations (application-level orchestration).
//!
//! `LedgerService` owns the invariant that a product's stock quantity
//! always equals the sum of signed effects of its ledger entries, and it
//! enforces it the same way for every operation:
//!
//! ```text
//! Request
//!   ↓
//! 1. Validate inputs (no store access yet)
//!   ↓
//! 2. Open one transaction scope (`InventoryStore::begin`)
//!   ↓
//! 3. Read + adjust the product quantity, append/patch entries
//!   ↓
//! 4. Commit, or drop the scope and discard every staged write
//! ```
//!
//! Each operation runs in exactly one transaction; a failure anywhere
//! (shortfall, missing row, store error) leaves both the product quantity
//! and the entry log exactly as they were before the call.
//!
//! This module contains no I/O itself; it composes the store traits, which
//! is what lets the same orchestration run against Postgres in production
//! and the in-memory store in tests.

use std::sync::Arc;

use serde::Serialize;

use stockroom_core::{DomainError, DomainResult, MovementId, ProductId};
use stockroom_ledger::{
    void_annotation, Movement, MovementPatch, MovementStatus, MovementType, NewMovement,
    StockDirection,
};
use stockroom_products::Product;

use crate::store::{InventoryStore, StoreError, StoreTx};

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        DomainError::Unknown(value.to_string())
    }
}

/// Read-side product join attached to movement responses. Display
/// convenience, not a correctness requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl ProductSnapshot {
    fn of(product: &Product, quantity: i64) -> Self {
        Self {
            name: product.name.clone(),
            price_cents: product.price_cents,
            quantity,
        }
    }
}

/// A movement joined with its product's current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRecord {
    pub movement: Movement,
    pub product: ProductSnapshot,
}

/// A movement joined with product snapshot and category name, for
/// single-entry reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementDetail {
    pub movement: Movement,
    pub product: ProductSnapshot,
    pub category_name: Option<String>,
}

/// Result of a void: both entries and the resulting product quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoidOutcome {
    pub original: MovementRecord,
    pub reversal: MovementRecord,
    pub adjusted_quantity: i64,
}

/// Input to [`LedgerService::record_movement`].
#[derive(Debug, Clone)]
pub struct RecordMovement {
    pub product_id: ProductId,
    pub quantity: i64,
    pub movement_type: MovementType,
    pub remarks: Option<String>,
}

/// Input to [`LedgerService::amend_movement`]; `None` fields are left
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct AmendMovement {
    pub quantity: Option<i64>,
    pub remarks: Option<String>,
}

/// Orchestrates every ledger operation as one atomic unit of work over an
/// injected store handle.
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn InventoryStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Record a movement: adjust the product quantity and append the ledger
    /// entry, atomically.
    ///
    /// The permitted-variant check happens where the wire value is parsed
    /// into [`MovementType`]; by the time a request reaches this method an
    /// invalid type is unrepresentable.
    pub async fn record_movement(&self, req: RecordMovement) -> DomainResult<MovementRecord> {
        if req.quantity <= 0 {
            return Err(DomainError::invalid_quantity(req.quantity));
        }

        let mut tx = self.store.begin().await?;
        let adjusted =
            adjust_inventory(tx.as_mut(), req.product_id, req.quantity, req.movement_type).await?;
        let movement = tx
            .insert_movement(NewMovement::recorded(
                req.product_id,
                req.quantity,
                req.movement_type,
                req.remarks,
            ))
            .await?;
        tx.commit().await?;

        tracing::info!(
            movement_id = %movement.id,
            product_id = %req.product_id,
            movement_type = %req.movement_type,
            quantity = req.quantity,
            new_quantity = adjusted.new_quantity,
            "movement recorded"
        );

        Ok(MovementRecord {
            product: ProductSnapshot::of(&adjusted.product, adjusted.new_quantity),
            movement,
        })
    }

    /// Fetch one entry, joined with product snapshot and category name.
    pub async fn movement(&self, id: MovementId) -> DomainResult<MovementDetail> {
        let movement = self
            .store
            .movement(id)
            .await?
            .ok_or_else(|| DomainError::movement_not_found(id))?;
        let product = self
            .store
            .product(movement.product_id)
            .await?
            .ok_or_else(|| DomainError::product_not_found(movement.product_id))?;

        let category_name = match product.category_id {
            Some(category_id) => self.store.category(category_id).await?.map(|c| c.name),
            None => None,
        };

        let quantity = product.quantity;
        Ok(MovementDetail {
            movement,
            product: ProductSnapshot::of(&product, quantity),
            category_name,
        })
    }

    /// All entries, newest first. A finite, re-queryable sequence.
    pub async fn movements(&self) -> DomainResult<Vec<Movement>> {
        Ok(self.store.movements().await?)
    }

    /// Correct a recorded movement without creating a second ledger line.
    ///
    /// When a new quantity is given, the original effect is backed out
    /// (reverse type, original quantity) and the new quantity applied with
    /// the original type, both inside the same transaction; a shortfall in
    /// the reapplication rolls the back-out away too.
    ///
    /// Voided and reversal entries cannot be amended; their accounting
    /// meaning is frozen.
    pub async fn amend_movement(
        &self,
        id: MovementId,
        req: AmendMovement,
    ) -> DomainResult<MovementRecord> {
        if let Some(quantity) = req.quantity {
            if quantity <= 0 {
                return Err(DomainError::invalid_quantity(quantity));
            }
        }

        let mut tx = self.store.begin().await?;
        let original = tx
            .movement(id)
            .await?
            .ok_or_else(|| DomainError::movement_not_found(id))?;

        match original.status {
            MovementStatus::Voided => return Err(DomainError::AlreadyVoided(id)),
            MovementStatus::Reversal => return Err(DomainError::ReversalImmutable(id)),
            MovementStatus::Active => {}
        }

        let adjusted = match req.quantity {
            Some(new_quantity) => {
                adjust_inventory(
                    tx.as_mut(),
                    original.product_id,
                    original.quantity,
                    original.movement_type.reverse(),
                )
                .await?;
                Some(
                    adjust_inventory(
                        tx.as_mut(),
                        original.product_id,
                        new_quantity,
                        original.movement_type,
                    )
                    .await?,
                )
            }
            None => None,
        };

        let movement = tx
            .update_movement(id, MovementPatch::amend(req.quantity, req.remarks))
            .await?;

        let (product, quantity) = match adjusted {
            Some(a) => (a.product, a.new_quantity),
            None => {
                let product = tx
                    .product_for_update(original.product_id)
                    .await?
                    .ok_or_else(|| DomainError::product_not_found(original.product_id))?;
                let quantity = product.quantity;
                (product, quantity)
            }
        };
        tx.commit().await?;

        tracing::info!(
            movement_id = %id,
            new_quantity = ?req.quantity,
            "movement amended"
        );

        Ok(MovementRecord {
            movement,
            product: ProductSnapshot::of(&product, quantity),
        })
    }

    /// Logically retract a movement: append a compensating reversal entry
    /// and annotate the original. This is the only retraction mechanism;
    /// ledger rows are never deleted.
    ///
    /// Voiding can itself fail with a shortfall: reversing an `IN` removes
    /// stock, which may already have been consumed elsewhere.
    pub async fn void_movement(&self, id: MovementId, void_reason: &str) -> DomainResult<VoidOutcome> {
        let mut tx = self.store.begin().await?;
        let original = tx
            .movement(id)
            .await?
            .ok_or_else(|| DomainError::movement_not_found(id))?;

        match original.status {
            MovementStatus::Voided => return Err(DomainError::AlreadyVoided(id)),
            MovementStatus::Reversal => return Err(DomainError::ReversalImmutable(id)),
            MovementStatus::Active => {}
        }

        let reversal = tx
            .insert_movement(NewMovement::reversal_of(&original, void_reason))
            .await?;
        let adjusted = adjust_inventory(
            tx.as_mut(),
            original.product_id,
            original.quantity,
            reversal.movement_type,
        )
        .await?;
        let original = tx
            .update_movement(
                id,
                MovementPatch::mark_voided(
                    void_annotation(original.remarks.as_deref(), void_reason, reversal.id),
                    reversal.id,
                ),
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            movement_id = %id,
            reversal_id = %reversal.id,
            adjusted_quantity = adjusted.new_quantity,
            "movement voided"
        );

        let product = ProductSnapshot::of(&adjusted.product, adjusted.new_quantity);
        Ok(VoidOutcome {
            original: MovementRecord {
                movement: original,
                product: product.clone(),
            },
            reversal: MovementRecord {
                movement: reversal,
                product,
            },
            adjusted_quantity: adjusted.new_quantity,
        })
    }
}

struct Adjusted {
    product: Product,
    new_quantity: i64,
}

/// Internal primitive: recompute and persist a product's quantity inside
/// the caller's transaction.
///
/// Decreasing types fail with `InsufficientInventory` before any write if
/// the result would go negative; the caller's transaction then rolls back
/// as a whole.
async fn adjust_inventory(
    tx: &mut dyn StoreTx,
    product_id: ProductId,
    quantity: i64,
    movement_type: MovementType,
) -> DomainResult<Adjusted> {
    let product = tx
        .product_for_update(product_id)
        .await?
        .ok_or_else(|| DomainError::product_not_found(product_id))?;

    let new_quantity = match movement_type.direction() {
        StockDirection::Inbound => product.quantity + quantity,
        StockDirection::Outbound => {
            let remaining = product.quantity - quantity;
            if remaining < 0 {
                return Err(DomainError::insufficient_inventory(
                    product_id,
                    product.quantity,
                    quantity,
                ));
            }
            remaining
        }
    };

    tx.set_product_quantity(product_id, new_quantity).await?;

    Ok(Adjusted {
        product,
        new_quantity,
    })
}
