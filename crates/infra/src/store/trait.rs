use async_trait::async_trait;
use thiserror::Error;

use crafter_core::{DomainError, ProjectId, RecipeId};
use crafter_inventory::{InventoryItem, InventoryKey};
use crafter_planner::RecipeBook;
use crafter_projects::{Project, ValidProject};
use crafter_recipes::{Recipe, ValidRecipe};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error.
///
/// ## Error Categories
///
/// - **NotFound / Conflict / Validation**: caller-facing failures, safe to
///   surface as-is.
/// - **Database / Corrupt / Lock**: storage failures; the message is for logs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Lock,
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg) => StoreError::Validation(msg),
        }
    }
}

/// Repository of everything the crafting service persists.
///
/// Implementations must keep recipe ingredients and project items in the
/// order they were written.
#[async_trait]
pub trait CraftingStore: Send + Sync {
    async fn list_inventory(&self) -> StoreResult<Vec<InventoryItem>>;

    /// Insert a new item. Fails with `Conflict` if `(name, tier)` exists.
    async fn add_inventory_item(&self, item: InventoryItem) -> StoreResult<InventoryItem>;

    /// Overwrite the held stock of an existing item.
    async fn set_inventory_quantity(
        &self,
        key: &InventoryKey,
        quantity: i64,
    ) -> StoreResult<InventoryItem>;

    /// Apply a relative stock change to an existing item.
    async fn adjust_inventory_quantity(
        &self,
        key: &InventoryKey,
        delta: i64,
    ) -> StoreResult<InventoryItem>;

    async fn delete_inventory_item(&self, key: &InventoryKey) -> StoreResult<()>;

    /// Every recipe with its ingredients, ordered by id.
    async fn list_recipes(&self) -> StoreResult<Vec<Recipe>>;

    /// Insert a recipe and its ingredients atomically. Fails with `Conflict`
    /// if the recipe name is taken.
    async fn add_recipe(&self, recipe: ValidRecipe) -> StoreResult<Recipe>;

    /// Delete a recipe together with its ingredients.
    async fn delete_recipe(&self, id: RecipeId) -> StoreResult<()>;

    /// Snapshot of all recipes for one expansion request.
    async fn recipe_book(&self) -> StoreResult<RecipeBook> {
        Ok(RecipeBook::new(self.list_recipes().await?))
    }

    /// Project summaries (without items), ordered by id.
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    async fn create_project(&self, project: ValidProject) -> StoreResult<Project>;

    async fn get_project(&self, id: ProjectId) -> StoreResult<Project>;

    /// Delete a project together with its items.
    async fn delete_project(&self, id: ProjectId) -> StoreResult<()>;
}
