//! Postgres-backed inventory store.
//!
//! ## Isolation
//!
//! Every ledger transaction takes `SELECT ... FOR UPDATE` on the product
//! row it is about to rewrite. Two concurrent movements against the same
//! product therefore serialize, and the second recomputes against the
//! first's committed quantity instead of a stale read.
//!
//! ## Rollback
//!
//! The unit of work rides a `sqlx::Transaction`; dropping it without a
//! commit rolls back every statement it issued.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use stockroom_core::{CategoryId, MovementId, ProductId};
use stockroom_ledger::{Movement, MovementPatch, NewMovement};
use stockroom_products::{Category, NewCategory, NewProduct, Product, ProductPatch};

use super::{InventoryStore, StoreError, StoreTx};

const MOVEMENT_COLUMNS: &str = "transaction_id, product_id, quantity, movement_type, status, \
     reversal_of, voided_by, remarks, transaction_date";

const PRODUCT_COLUMNS: &str =
    "product_id, name, description, category_id, quantity, price_cents, created_at, updated_at";

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(include_str!("schema.sql"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn movement_from_row(row: &PgRow) -> Result<Movement, StoreError> {
    let movement_type: String = row.try_get("movement_type")?;
    let status: String = row.try_get("status")?;

    Ok(Movement {
        id: MovementId::new(row.try_get("transaction_id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        quantity: row.try_get("quantity")?,
        movement_type: movement_type
            .parse()
            .map_err(|e| StoreError::internal(format!("bad movement row: {e}")))?,
        status: status
            .parse()
            .map_err(|e| StoreError::internal(format!("bad movement row: {e}")))?,
        reversal_of: row
            .try_get::<Option<i64>, _>("reversal_of")?
            .map(MovementId::new),
        voided_by: row
            .try_get::<Option<i64>, _>("voided_by")?
            .map(MovementId::new),
        remarks: row.try_get("remarks")?,
        transaction_date: row.try_get("transaction_date")?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId::new(row.try_get("product_id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category_id: row
            .try_get::<Option<i64>, _>("category_id")?
            .map(CategoryId::new),
        quantity: row.try_get("quantity")?,
        price_cents: row.try_get("price_cents")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, StoreError> {
    Ok(Category {
        id: CategoryId::new(row.try_get("category_id")?),
        name: row.try_get("name")?,
    })
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1 FOR UPDATE"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn set_product_quantity(
        &mut self,
        id: ProductId,
        quantity: i64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE products SET quantity = $2, updated_at = NOW() WHERE product_id = $1",
        )
        .bind(id.as_i64())
        .bind(quantity)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::internal(format!(
                "product #{id} missing during update"
            )));
        }
        Ok(())
    }

    async fn movement(&mut self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_transactions WHERE transaction_id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(movement_from_row).transpose()
    }

    async fn insert_movement(&mut self, new: NewMovement) -> Result<Movement, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO inventory_transactions \
                 (product_id, quantity, movement_type, status, reversal_of, remarks) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {MOVEMENT_COLUMNS}"
        ))
        .bind(new.product_id.as_i64())
        .bind(new.quantity)
        .bind(new.movement_type.as_str())
        .bind(new.status.as_str())
        .bind(new.reversal_of.map(|id| id.as_i64()))
        .bind(new.remarks)
        .fetch_one(&mut *self.tx)
        .await?;

        movement_from_row(&row)
    }

    async fn update_movement(
        &mut self,
        id: MovementId,
        patch: MovementPatch,
    ) -> Result<Movement, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE inventory_transactions SET \
                 quantity = COALESCE($2, quantity), \
                 remarks = COALESCE($3, remarks), \
                 status = COALESCE($4, status), \
                 voided_by = COALESCE($5, voided_by), \
                 transaction_date = CASE WHEN $6 THEN NOW() ELSE transaction_date END \
             WHERE transaction_id = $1 \
             RETURNING {MOVEMENT_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(patch.quantity)
        .bind(patch.remarks)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.voided_by.map(|id| id.as_i64()))
        .bind(patch.refresh_date)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| StoreError::internal(format!("movement #{id} missing during update")))?;

        movement_from_row(&row)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_transactions WHERE transaction_id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(movement_from_row).transpose()
    }

    async fn movements(&self) -> Result<Vec<Movement>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_transactions \
             ORDER BY transaction_date DESC, transaction_id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(movement_from_row).collect()
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO products (name, description, category_id, quantity, price_cents) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(new.name)
        .bind(new.description)
        .bind(new.category_id.map(|id| id.as_i64()))
        .bind(new.opening_quantity)
        .bind(new.price_cents)
        .fetch_one(&self.pool)
        .await?;

        product_from_row(&row)
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE products SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 category_id = COALESCE($4, category_id), \
                 price_cents = COALESCE($5, price_cents), \
                 updated_at = NOW() \
             WHERE product_id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.category_id.map(|id| id.as_i64()))
        .bind(patch.price_cents)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn product_has_movements(&self, id: ProductId) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM inventory_transactions WHERE product_id = $1) AS present",
        )
        .bind(id.as_i64())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("present")?)
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query("SELECT category_id, name FROM categories WHERE category_id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(category_from_row).transpose()
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT category_id, name FROM categories ORDER BY category_id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(category_from_row).collect()
    }

    async fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let row = sqlx::query("INSERT INTO categories (name) VALUES ($1) RETURNING category_id, name")
            .bind(new.name)
            .fetch_one(&self.pool)
            .await?;

        category_from_row(&row)
    }
}
