use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};

use crafter_inventory::{InventoryKey, NewInventoryItem};

use crate::app::dto::{self, StockChange};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:name/:tier", patch(update_item).delete(delete_item))
}

pub async fn list_items(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().list_inventory().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewInventoryItem>,
) -> axum::response::Response {
    let item = match body.validate() {
        Ok(item) => item,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().add_inventory_item(item).await {
        Ok(item) => {
            tracing::info!(key = %item.key(), "inventory item created");
            (StatusCode::CREATED, Json(item)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((name, tier)): Path<(String, String)>,
    Json(body): Json<dto::UpdateInventoryRequest>,
) -> axum::response::Response {
    let key = match InventoryKey::new(&name, &tier) {
        Ok(key) => key,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let change = match body.into_change() {
        Ok(change) => change,
        Err(response) => return response,
    };

    let store = services.store();
    let result = match change {
        StockChange::Set(quantity) => store.set_inventory_quantity(&key, quantity).await,
        StockChange::Adjust(delta) => store.adjust_inventory_quantity(&key, delta).await,
    };

    match result {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((name, tier)): Path<(String, String)>,
) -> axum::response::Response {
    let key = match InventoryKey::new(&name, &tier) {
        Ok(key) => key,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().delete_inventory_item(&key).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
