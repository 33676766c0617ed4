use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use stockroom_products::NewCategory;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(create_category).get(list_categories))
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCategoryRequest>,
) -> axum::response::Response {
    let new = NewCategory { name: body.name };

    match services.category_create(new).await {
        Ok(category) => {
            (StatusCode::CREATED, Json(dto::category_to_json(&category))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.categories_list().await {
        Ok(categories) => {
            let items: Vec<_> = categories.iter().map(dto::category_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!(items))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
