//! HTTP surface over [`InventoryService`]: JSON product routes and an SSE change feed.

pub mod errors;
pub mod events;
pub mod products;

use axum::{extract::Extension, routing::get, Json, Router};
use serde_json::{json, Value as JsonValue};

use crate::services::InventoryService;

pub fn router(service: InventoryService) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(products::router())
        .merge(events::router())
        .layer(Extension(service))
}

async fn health(Extension(service): Extension<InventoryService>) -> Json<JsonValue> {
    let stats = service.bus().stats();
    Json(json!({
        "status": "ok",
        "shards": service.store().shard_count(),
        "subscribers": stats.subscribers,
        "eventsPublished": stats.published,
        "eventsDropped": stats.dropped,
    }))
}
