//! `stockroom-products` — product catalog domain types.

pub mod category;
pub mod product;

pub use category::{Category, NewCategory};
pub use product::{NewProduct, Product, ProductPatch};
