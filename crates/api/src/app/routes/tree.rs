use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crafter_planner::ExpandRequest;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/tree", post(expand_tree).get(catalog_tree))
        .route("/materials", post(required_materials))
}

/// Production tree, shopping list and node errors for one item.
pub async fn expand_tree(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ExpandRequest>,
) -> axum::response::Response {
    let expander = match services.expander().await {
        Ok(expander) => expander,
        Err(e) => return errors::store_error_to_response(e),
    };

    match expander.expand(&body) {
        Ok(report) => {
            if !report.errors.is_empty() {
                tracing::warn!(
                    item = %body.item_name,
                    errors = report.errors.len(),
                    "expansion finished with node errors"
                );
            }
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => errors::invalid_request_to_response(e),
    }
}

/// Every craftable item expanded once.
pub async fn catalog_tree(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.expander().await {
        Ok(expander) => (StatusCode::OK, Json(expander.catalog())).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Shopping list only: a bare `{item: quantity}` map when nothing failed,
/// otherwise `{shopping_list, errors}`.
pub async fn required_materials(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ExpandRequest>,
) -> axum::response::Response {
    let (item, quantity) = match body.validate() {
        Ok(v) => v,
        Err(e) => return errors::invalid_request_to_response(e),
    };
    let expander = match services.expander().await {
        Ok(expander) => expander,
        Err(e) => return errors::store_error_to_response(e),
    };

    let flattened = expander.required_materials(item.as_str(), quantity);
    (StatusCode::OK, Json(flattened.into_legacy_json())).into_response()
}
