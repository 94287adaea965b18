use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

use crafter_core::RecipeId;
use crafter_recipes::NewRecipe;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/:id", delete(delete_recipe))
}

pub async fn list_recipes(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().list_recipes().await {
        Ok(recipes) => (StatusCode::OK, Json(recipes)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_recipe(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewRecipe>,
) -> axum::response::Response {
    let recipe = match body.validate() {
        Ok(recipe) => recipe,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().add_recipe(recipe).await {
        Ok(recipe) => {
            tracing::info!(
                recipe_id = %recipe.id_typed(),
                output_item = %recipe.output_item(),
                "recipe created"
            );
            (StatusCode::CREATED, Json(recipe)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_recipe(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RecipeId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().delete_recipe(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
