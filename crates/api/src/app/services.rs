//! Infrastructure wiring: pick the backing store and expose the services
//! the route handlers call.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use stockroom_core::{DomainError, DomainResult, ProductId};
use stockroom_infra::{InMemoryStore, InventoryStore, LedgerService, PostgresStore};
use stockroom_products::{Category, NewCategory, NewProduct, Product, ProductPatch};

/// Shared application services handed to every request handler.
pub struct AppServices {
    store: Arc<dyn InventoryStore>,
    ledger: LedgerService,
}

impl AppServices {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        let ledger = LedgerService::new(store.clone());
        Self { store, ledger }
    }

    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }

    pub async fn product_create(&self, new: NewProduct) -> DomainResult<Product> {
        new.validate()?;
        Ok(self.store.insert_product(new).await?)
    }

    pub async fn product_get(&self, id: ProductId) -> DomainResult<Product> {
        self.store
            .product(id)
            .await?
            .ok_or_else(|| DomainError::product_not_found(id))
    }

    pub async fn products_list(&self) -> DomainResult<Vec<Product>> {
        Ok(self.store.products().await?)
    }

    pub async fn product_update(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        patch.validate()?;
        self.store
            .update_product(id, patch)
            .await?
            .ok_or_else(|| DomainError::product_not_found(id))
    }

    /// Remove a product from the catalog. Products with ledger entries
    /// cannot be deleted: the entries reference them forever.
    pub async fn product_delete(&self, id: ProductId) -> DomainResult<()> {
        if self.store.product(id).await?.is_none() {
            return Err(DomainError::product_not_found(id));
        }
        if self.store.product_has_movements(id).await? {
            return Err(DomainError::validation(
                "product has ledger entries and cannot be deleted",
            ));
        }
        self.store.delete_product(id).await?;
        Ok(())
    }

    pub async fn category_create(&self, new: NewCategory) -> DomainResult<Category> {
        new.validate()?;
        Ok(self.store.insert_category(new).await?)
    }

    pub async fn categories_list(&self) -> DomainResult<Vec<Category>> {
        Ok(self.store.categories().await?)
    }
}

/// Select the backing store from the environment: `DATABASE_URL` set →
/// Postgres, otherwise the volatile in-memory store (dev/tests).
pub async fn build_services() -> anyhow::Result<AppServices> {
    let store: Arc<dyn InventoryStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = PgPoolOptions::new().max_connections(8).connect(&url).await?;
            let store = PostgresStore::new(pool);
            store.ensure_schema().await?;
            tracing::info!("using postgres store");
            Arc::new(store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using volatile in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    Ok(AppServices::new(store))
}
