use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CategoryId, DomainError, DomainResult, ProductId};

/// Catalog product.
///
/// `quantity` is the running stock level owned by the ledger: the catalog
/// sets it once at creation (opening stock) and every change after that
/// flows through a ledger movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub quantity: i64,
    /// Unit price in the smallest currency unit.
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new product; id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub opening_quantity: i64,
    pub price_cents: i64,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.opening_quantity < 0 {
            return Err(DomainError::validation("opening quantity cannot be negative"));
        }
        if self.price_cents < 0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(())
    }
}

/// Catalog-side update. Stock quantity is deliberately absent: stock
/// changes flow only through ledger movements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price_cents: Option<i64>,
}

impl ProductPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if let Some(price) = self.price_cents {
            if price < 0 {
                return Err(DomainError::validation("price cannot be negative"));
            }
        }
        Ok(())
    }
}
