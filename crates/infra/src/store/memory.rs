//! In-memory inventory store.
//!
//! Intended for tests/dev. A transaction stages its writes against a clone
//! of the shared state and publishes the clone on commit; the owned mutex
//! guard serializes transactions, so every transaction recomputes against
//! the previously committed state and a dropped handle discards its staged
//! writes wholesale.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use stockroom_core::{CategoryId, MovementId, ProductId};
use stockroom_ledger::{Movement, MovementPatch, NewMovement};
use stockroom_products::{Category, NewCategory, NewProduct, Product, ProductPatch};

use super::{InventoryStore, StoreError, StoreTx};

#[derive(Debug, Clone)]
struct State {
    products: Vec<Product>,
    categories: Vec<Category>,
    movements: Vec<Movement>,
    next_product_id: i64,
    next_category_id: i64,
    next_movement_id: i64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            categories: Vec::new(),
            movements: Vec::new(),
            next_product_id: 1,
            next_category_id: 1,
            next_movement_id: 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

struct InMemoryTx {
    guard: OwnedMutexGuard<State>,
    work: State,
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.work.products.iter().find(|p| p.id == id).cloned())
    }

    async fn set_product_quantity(
        &mut self,
        id: ProductId,
        quantity: i64,
    ) -> Result<(), StoreError> {
        let product = self
            .work
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::internal(format!("product #{id} missing during update")))?;
        product.quantity = quantity;
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn movement(&mut self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        Ok(self.work.movements.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_movement(&mut self, new: NewMovement) -> Result<Movement, StoreError> {
        let movement = Movement {
            id: MovementId::new(self.work.next_movement_id),
            product_id: new.product_id,
            quantity: new.quantity,
            movement_type: new.movement_type,
            status: new.status,
            reversal_of: new.reversal_of,
            voided_by: None,
            remarks: new.remarks,
            transaction_date: Utc::now(),
        };
        self.work.next_movement_id += 1;
        self.work.movements.push(movement.clone());
        Ok(movement)
    }

    async fn update_movement(
        &mut self,
        id: MovementId,
        patch: MovementPatch,
    ) -> Result<Movement, StoreError> {
        let movement = self
            .work
            .movements
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::internal(format!("movement #{id} missing during update")))?;

        if let Some(quantity) = patch.quantity {
            movement.quantity = quantity;
        }
        if let Some(remarks) = patch.remarks {
            movement.remarks = Some(remarks);
        }
        if let Some(status) = patch.status {
            movement.status = status;
        }
        if let Some(voided_by) = patch.voided_by {
            movement.voided_by = Some(voided_by);
        }
        if patch.refresh_date {
            movement.transaction_date = Utc::now();
        }
        Ok(movement.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut this = *self;
        *this.guard = this.work;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(InMemoryTx { guard, work }))
    }

    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.movements.iter().find(|m| m.id == id).cloned())
    }

    async fn movements(&self) -> Result<Vec<Movement>, StoreError> {
        let state = self.state.lock().await;
        let mut movements = state.movements.clone();
        movements.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(movements)
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.state.lock().await;
        let mut products = state.products.clone();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(state.next_product_id),
            name: new.name,
            description: new.description,
            category_id: new.category_id,
            quantity: new.opening_quantity,
            price_cents: new.price_cents,
            created_at: now,
            updated_at: now,
        };
        state.next_product_id += 1;
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut state = self.state.lock().await;
        let Some(product) = state.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(category_id) = patch.category_id {
            product.category_id = Some(category_id);
        }
        if let Some(price_cents) = patch.price_cents {
            product.price_cents = price_cents;
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        Ok(state.products.len() < before)
    }

    async fn product_has_movements(&self, id: ProductId) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        Ok(state.movements.iter().any(|m| m.product_id == id))
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.categories.clone())
    }

    async fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let mut state = self.state.lock().await;
        let category = Category {
            id: CategoryId::new(state.next_category_id),
            name: new.name,
        };
        state.next_category_id += 1;
        state.categories.push(category.clone());
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use stockroom_ledger::MovementType;

    use super::*;

    fn seed_product(name: &str, quantity: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            category_id: None,
            opening_quantity: quantity,
            price_cents: 1_000,
        }
    }

    #[tokio::test]
    async fn commit_publishes_staged_writes() {
        let store = InMemoryStore::new();
        let product = store.insert_product(seed_product("Mouse", 10)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.set_product_quantity(product.id, 7).await.unwrap();
        tx.insert_movement(NewMovement::recorded(
            product.id,
            3,
            MovementType::Sale,
            None,
        ))
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.product(product.id).await.unwrap().unwrap().quantity, 7);
        assert_eq!(store.movements().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_staged_writes() {
        let store = InMemoryStore::new();
        let product = store.insert_product(seed_product("Mouse", 10)).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.set_product_quantity(product.id, 0).await.unwrap();
            tx.insert_movement(NewMovement::recorded(
                product.id,
                10,
                MovementType::Out,
                None,
            ))
            .await
            .unwrap();
            // no commit
        }

        assert_eq!(
            store.product(product.id).await.unwrap().unwrap().quantity,
            10
        );
        assert!(store.movements().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn transaction_reads_observe_its_own_writes() {
        let store = InMemoryStore::new();
        let product = store.insert_product(seed_product("Mouse", 10)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.set_product_quantity(product.id, 4).await.unwrap();
        let seen = tx.product_for_update(product.id).await.unwrap().unwrap();
        assert_eq!(seen.quantity, 4);
    }

    #[tokio::test]
    async fn movement_ids_are_monotonic() {
        let store = InMemoryStore::new();
        let product = store.insert_product(seed_product("Mouse", 10)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let first = tx
            .insert_movement(NewMovement::recorded(product.id, 1, MovementType::In, None))
            .await
            .unwrap();
        let second = tx
            .insert_movement(NewMovement::recorded(product.id, 1, MovementType::In, None))
            .await
            .unwrap();
        assert!(second.id > first.id);
    }
}
