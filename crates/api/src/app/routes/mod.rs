use axum::Router;

pub mod categories;
pub mod products;
pub mod system;
pub mod transactions;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/transactions", transactions::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
}
