use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crafter_core::{ProjectId, RecipeId};
use crafter_inventory::{InventoryItem, InventoryKey};
use crafter_projects::{Project, ValidProject};
use crafter_recipes::{Recipe, ValidRecipe};

use super::r#trait::{CraftingStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    /// Insertion order is the listing order.
    inventory: Vec<InventoryItem>,
    recipes: BTreeMap<RecipeId, Recipe>,
    projects: BTreeMap<ProjectId, Project>,
    last_recipe_id: i64,
    last_project_id: i64,
}

/// In-memory crafting store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCraftingStore {
    inner: RwLock<State>,
}

impl InMemoryCraftingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.inner.read().map_err(|_| StoreError::Lock)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.inner.write().map_err(|_| StoreError::Lock)
    }
}

#[async_trait]
impl CraftingStore for InMemoryCraftingStore {
    async fn list_inventory(&self) -> StoreResult<Vec<InventoryItem>> {
        Ok(self.read()?.inventory.clone())
    }

    async fn add_inventory_item(&self, item: InventoryItem) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        if state.inventory.iter().any(|i| i.key() == item.key()) {
            return Err(StoreError::Conflict(format!(
                "inventory item {} already exists",
                item.key()
            )));
        }
        state.inventory.push(item.clone());
        Ok(item)
    }

    async fn set_inventory_quantity(
        &self,
        key: &InventoryKey,
        quantity: i64,
    ) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        let item = state
            .inventory
            .iter_mut()
            .find(|i| i.key() == key)
            .ok_or_else(|| StoreError::NotFound(format!("inventory item {key}")))?;
        item.set_quantity(quantity)?;
        Ok(item.clone())
    }

    async fn adjust_inventory_quantity(
        &self,
        key: &InventoryKey,
        delta: i64,
    ) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        let item = state
            .inventory
            .iter_mut()
            .find(|i| i.key() == key)
            .ok_or_else(|| StoreError::NotFound(format!("inventory item {key}")))?;
        item.adjust(delta)?;
        Ok(item.clone())
    }

    async fn delete_inventory_item(&self, key: &InventoryKey) -> StoreResult<()> {
        let mut state = self.write()?;
        let before = state.inventory.len();
        state.inventory.retain(|i| i.key() != key);
        if state.inventory.len() == before {
            return Err(StoreError::NotFound(format!("inventory item {key}")));
        }
        Ok(())
    }

    async fn list_recipes(&self) -> StoreResult<Vec<Recipe>> {
        Ok(self.read()?.recipes.values().cloned().collect())
    }

    async fn add_recipe(&self, recipe: ValidRecipe) -> StoreResult<Recipe> {
        let mut state = self.write()?;
        if state.recipes.values().any(|r| r.name() == recipe.name) {
            return Err(StoreError::Conflict(format!(
                "recipe {} already exists",
                recipe.name
            )));
        }
        state.last_recipe_id += 1;
        let id = RecipeId::new(state.last_recipe_id);
        let recipe = recipe.with_id(id);
        state.recipes.insert(id, recipe.clone());
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: RecipeId) -> StoreResult<()> {
        self.write()?
            .recipes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("recipe {id}")))
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self
            .read()?
            .projects
            .values()
            .map(Project::without_items)
            .collect())
    }

    async fn create_project(&self, project: ValidProject) -> StoreResult<Project> {
        let mut state = self.write()?;
        state.last_project_id += 1;
        let id = ProjectId::new(state.last_project_id);
        let project = project.with_id(id, Utc::now());
        state.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: ProjectId) -> StoreResult<Project> {
        self.read()?
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("project {id}")))
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        self.write()?
            .projects
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("project {id}")))
    }
}
