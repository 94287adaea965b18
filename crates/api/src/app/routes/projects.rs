use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crafter_core::ProjectId;
use crafter_projects::NewProject;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/:id", get(get_project).delete(delete_project))
}

pub async fn list_projects(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().list_projects().await {
        Ok(projects) => (StatusCode::OK, Json(projects)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewProject>,
) -> axum::response::Response {
    let project = match body.validate() {
        Ok(project) => project,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().create_project(project).await {
        Ok(project) => {
            tracing::info!(project_id = %project.id_typed(), "project created");
            (StatusCode::CREATED, Json(project)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// The project, its items, one tree per item and the merged shopping list.
pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let project = match services.store().get_project(id).await {
        Ok(project) => project,
        Err(e) => return errors::store_error_to_response(e),
    };
    let expander = match services.expander().await {
        Ok(expander) => expander,
        Err(e) => return errors::store_error_to_response(e),
    };

    let (targets, skipped) = dto::project_targets(&project);
    let plan = expander.plan_project(targets);
    (StatusCode::OK, Json(dto::ProjectDetail::new(project, plan, skipped))).into_response()
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().delete_project(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
