use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::errors;
use crate::domain::{ProductCreate, ProductName, ProductUpdate};
use crate::services::InventoryService;

pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:name",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

pub async fn create_product(
    Extension(service): Extension<InventoryService>,
    body: Result<Json<ProductCreate>, JsonRejection>,
) -> axum::response::Response {
    let Json(params) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match service.create_product(params).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}

pub async fn list_products(Extension(service): Extension<InventoryService>) -> axum::response::Response {
    match service.list_products().await {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(service): Extension<InventoryService>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let name = match ProductName::new(name) {
        Ok(name) => name,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match service.find_product(name).await {
        Ok(product) => Json(product).into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(service): Extension<InventoryService>,
    Path(name): Path<String>,
    body: Result<Json<ProductUpdate>, JsonRejection>,
) -> axum::response::Response {
    let name = match ProductName::new(name) {
        Ok(name) => name,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match service.update_product(name, patch).await {
        Ok(product) => Json(product).into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(service): Extension<InventoryService>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let name = match ProductName::new(name) {
        Ok(name) => name,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match service.delete_product(name).await {
        Ok(product) => Json(json!({
            "name": product.name,
            "deleted": true,
        }))
        .into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}
