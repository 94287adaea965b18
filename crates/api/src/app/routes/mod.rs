use axum::Router;

pub mod inventory;
pub mod projects;
pub mod recipes;
pub mod system;
pub mod tree;

/// Router for every endpoint under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/inventory", inventory::router())
        .nest("/recipes", recipes::router())
        .nest("/projects", projects::router())
        .merge(tree::router())
}
