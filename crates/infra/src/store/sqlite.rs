//! SQLite-backed crafting store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError | Scenario |
//! |------------|------------|----------|
//! | Database (unique violation) | `Conflict` | duplicate `(item_name, tier)` or recipe name |
//! | Database (other) | `Database` | constraint or I/O failure |
//! | other | `Database` | pool closed, connection failures, etc. |
//!
//! Rows that no longer satisfy the domain rules (e.g. a blank item name written
//! by another tool) surface as `Corrupt`.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{error, info, instrument, warn};

use crafter_core::{ItemName, ProjectId, RecipeId};
use crafter_inventory::{InventoryItem, InventoryKey};
use crafter_planner::RecipeBook;
use crafter_projects::{Project, ProjectItem, ValidProject};
use crafter_recipes::{Ingredient, Recipe, ValidRecipe};

use super::r#trait::{CraftingStore, StoreError, StoreResult};
use super::schema;

/// SQLite-backed crafting store.
///
/// `SqlitePool` is `Send + Sync` and cheap to clone, so the store can be shared
/// behind an `Arc` by every request handler.
#[derive(Debug, Clone)]
pub struct SqliteCraftingStore {
    pool: SqlitePool,
}

impl SqliteCraftingStore {
    /// Open (creating if needed) the database at `url` and bootstrap the schema.
    ///
    /// In-memory URLs get a single long-lived connection so every query sees
    /// the same database.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            ensure_parent_dir(options.get_filename())?;
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        info!(url, "sqlite store connected");
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and bootstrap the schema.
    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        schema::migrate(&pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_inventory_item(&self, key: &InventoryKey) -> StoreResult<Option<InventoryItem>> {
        let row = sqlx::query(
            r#"
            SELECT item_name, tier, quantity, category, source, is_craftable, notes
            FROM inventory
            WHERE item_name = ?1 AND tier = ?2
            "#,
        )
        .bind(key.name.as_str())
        .bind(&key.tier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_inventory_item", e))?;

        row.as_ref().map(inventory_from_row).transpose()
    }

    async fn store_quantity(&self, item: &InventoryItem) -> StoreResult<()> {
        sqlx::query("UPDATE inventory SET quantity = ?1 WHERE item_name = ?2 AND tier = ?3")
            .bind(item.quantity())
            .bind(item.name().as_str())
            .bind(item.tier())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("store_quantity", e))?;
        Ok(())
    }

    async fn load_recipes(&self) -> StoreResult<RecipeRows> {
        let ingredient_rows = sqlx::query(
            r#"
            SELECT recipe_id, input_item, quantity
            FROM ingredients
            ORDER BY recipe_id ASC, ingredient_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_ingredients", e))?;

        let mut ingredients: HashMap<i64, Vec<Ingredient>> = HashMap::new();
        let mut broken: HashMap<i64, String> = HashMap::new();
        for row in &ingredient_rows {
            let recipe_id: i64 = row.try_get("recipe_id")?;
            let raw: String = row.try_get("input_item")?;
            match parse_stored_name(&raw) {
                Ok(input_item) => ingredients.entry(recipe_id).or_default().push(Ingredient {
                    input_item,
                    quantity: row.try_get("quantity")?,
                }),
                Err(problem) => {
                    broken
                        .entry(recipe_id)
                        .or_insert_with(|| format!("recipe {recipe_id}: ingredient {problem}"));
                }
            }
        }

        let recipe_rows = sqlx::query(
            r#"
            SELECT recipe_id, recipe_name, output_item, output_qty, is_shaped, notes
            FROM recipes
            ORDER BY recipe_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_recipes", e))?;

        let mut out = RecipeRows {
            recipes: Vec::with_capacity(recipe_rows.len()),
            unreadable: Vec::new(),
            skipped: Vec::new(),
        };
        for row in &recipe_rows {
            let id: i64 = row.try_get("recipe_id")?;
            let raw: String = row.try_get("output_item")?;
            let output_item = match parse_stored_name(&raw) {
                Ok(name) => name,
                Err(problem) => {
                    out.skipped.push(format!("recipe {id}: output {problem}"));
                    continue;
                }
            };
            if let Some(reason) = broken.remove(&id) {
                out.unreadable.push((RecipeId::new(id), reason));
            }
            out.recipes.push(Recipe::rehydrate(
                RecipeId::new(id),
                row.try_get("recipe_name")?,
                output_item,
                row.try_get("output_qty")?,
                row.try_get("is_shaped")?,
                row.try_get("notes")?,
                ingredients.remove(&id).unwrap_or_default(),
            ));
        }
        Ok(out)
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn ensure_parent_dir(path: &Path) -> StoreResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Database(sqlx::Error::Io(e)))
        }
        _ => Ok(()),
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(format!("{operation}: {}", db_err.message()));
        }
    }
    error!(operation, error = %err, "sqlite operation failed");
    StoreError::Database(err)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn parse_stored_name(raw: &str) -> Result<ItemName, String> {
    ItemName::parse(raw).map_err(|e| format!("item name {raw:?}: {e}"))
}

fn stored_name(raw: String) -> StoreResult<ItemName> {
    parse_stored_name(&raw).map_err(StoreError::Corrupt)
}

/// Recipes read without giving up on the first bad row.
struct RecipeRows {
    recipes: Vec<Recipe>,
    /// Recipes kept in `recipes` whose ingredient rows could not all be
    /// decoded, with the first problem found.
    unreadable: Vec<(RecipeId, String)>,
    /// Recipe rows left out entirely because their own columns are bad.
    skipped: Vec<String>,
}

impl RecipeRows {
    fn first_problem(&self) -> Option<&str> {
        self.skipped
            .first()
            .or_else(|| self.unreadable.first().map(|(_, reason)| reason))
            .map(String::as_str)
    }
}

fn inventory_from_row(row: &SqliteRow) -> StoreResult<InventoryItem> {
    let key = InventoryKey {
        name: stored_name(row.try_get("item_name")?)?,
        tier: row.try_get("tier")?,
    };
    Ok(InventoryItem::rehydrate(
        key,
        row.try_get("quantity")?,
        row.try_get("category")?,
        row.try_get("source")?,
        row.try_get("is_craftable")?,
        row.try_get("notes")?,
    ))
}

fn project_from_row(row: &SqliteRow, items: Vec<ProjectItem>) -> StoreResult<Project> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Project::rehydrate(
        ProjectId::new(row.try_get("project_id")?),
        row.try_get("name")?,
        row.try_get("description")?,
        created_at,
        items,
    ))
}

#[async_trait]
impl CraftingStore for SqliteCraftingStore {
    async fn list_inventory(&self) -> StoreResult<Vec<InventoryItem>> {
        let rows = sqlx::query(
            r#"
            SELECT item_name, tier, quantity, category, source, is_craftable, notes
            FROM inventory
            ORDER BY rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_inventory", e))?;

        rows.iter().map(inventory_from_row).collect()
    }

    #[instrument(skip(self, item), fields(key = %item.key()), err)]
    async fn add_inventory_item(&self, item: InventoryItem) -> StoreResult<InventoryItem> {
        sqlx::query(
            r#"
            INSERT INTO inventory (item_name, tier, quantity, category, source, is_craftable, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(item.name().as_str())
        .bind(item.tier())
        .bind(item.quantity())
        .bind(item.category())
        .bind(item.source())
        .bind(item.is_craftable())
        .bind(item.notes())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(format!("inventory item {} already exists", item.key()))
            } else {
                map_sqlx_error("add_inventory_item", e)
            }
        })?;

        Ok(item)
    }

    #[instrument(skip(self, key), fields(key = %key), err)]
    async fn set_inventory_quantity(
        &self,
        key: &InventoryKey,
        quantity: i64,
    ) -> StoreResult<InventoryItem> {
        let mut item = self
            .load_inventory_item(key)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("inventory item {key}")))?;
        item.set_quantity(quantity)?;
        self.store_quantity(&item).await?;
        Ok(item)
    }

    #[instrument(skip(self, key), fields(key = %key), err)]
    async fn adjust_inventory_quantity(
        &self,
        key: &InventoryKey,
        delta: i64,
    ) -> StoreResult<InventoryItem> {
        let mut item = self
            .load_inventory_item(key)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("inventory item {key}")))?;
        item.adjust(delta)?;
        self.store_quantity(&item).await?;
        Ok(item)
    }

    async fn delete_inventory_item(&self, key: &InventoryKey) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM inventory WHERE item_name = ?1 AND tier = ?2")
            .bind(key.name.as_str())
            .bind(&key.tier)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_inventory_item", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("inventory item {key}")));
        }
        Ok(())
    }

    async fn list_recipes(&self) -> StoreResult<Vec<Recipe>> {
        let rows = self.load_recipes().await?;
        if let Some(problem) = rows.first_problem() {
            return Err(StoreError::Corrupt(problem.to_string()));
        }
        Ok(rows.recipes)
    }

    /// Bad recipe rows do not fail the whole snapshot: a recipe with a bad
    /// ingredient fails its own tree node, a recipe with a bad output item
    /// is left out.
    async fn recipe_book(&self) -> StoreResult<RecipeBook> {
        let rows = self.load_recipes().await?;
        for problem in &rows.skipped {
            warn!(problem = %problem, "recipe left out of the recipe book");
        }

        let mut book = RecipeBook::new(rows.recipes);
        for (recipe_id, reason) in rows.unreadable {
            warn!(%recipe_id, reason = %reason, "recipe has unreadable ingredients");
            book.mark_unreadable(recipe_id, reason);
        }
        Ok(book)
    }

    #[instrument(skip(self, recipe), fields(recipe = %recipe.name), err)]
    async fn add_recipe(&self, recipe: ValidRecipe) -> StoreResult<Recipe> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let id = sqlx::query(
            r#"
            INSERT INTO recipes (recipe_name, output_item, output_qty, is_shaped, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&recipe.name)
        .bind(recipe.output_item.as_str())
        .bind(recipe.output_qty)
        .bind(recipe.is_shaped)
        .bind(&recipe.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(format!("recipe {} already exists", recipe.name))
            } else {
                map_sqlx_error("insert_recipe", e)
            }
        })?
        .last_insert_rowid();

        for ingredient in &recipe.ingredients {
            sqlx::query(
                "INSERT INTO ingredients (recipe_id, input_item, quantity) VALUES (?1, ?2, ?3)",
            )
            .bind(id)
            .bind(ingredient.input_item.as_str())
            .bind(ingredient.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_ingredient", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(recipe.with_id(RecipeId::new(id)))
    }

    async fn delete_recipe(&self, id: RecipeId) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("DELETE FROM ingredients WHERE recipe_id = ?1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_ingredients", e))?;
        let result = sqlx::query("DELETE FROM recipes WHERE recipe_id = ?1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_recipe", e))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound(format!("recipe {id}")));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query(
            r#"
            SELECT project_id, name, description, created_at
            FROM projects
            ORDER BY project_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_projects", e))?;

        rows.iter().map(|row| project_from_row(row, Vec::new())).collect()
    }

    #[instrument(skip(self, project), fields(project = %project.name), err)]
    async fn create_project(&self, project: ValidProject) -> StoreResult<Project> {
        let created_at = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let id = sqlx::query(
            "INSERT INTO projects (name, description, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_project", e))?
        .last_insert_rowid();

        for item in &project.items {
            sqlx::query(
                r#"
                INSERT INTO project_items (project_id, item_name, tier, quantity)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(id)
            .bind(item.item_name.as_str())
            .bind(&item.tier)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_project_item", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(project.with_id(ProjectId::new(id), created_at))
    }

    async fn get_project(&self, id: ProjectId) -> StoreResult<Project> {
        let row = sqlx::query(
            "SELECT project_id, name, description, created_at FROM projects WHERE project_id = ?1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_project", e))?
        .ok_or_else(|| StoreError::NotFound(format!("project {id}")))?;

        let item_rows = sqlx::query(
            r#"
            SELECT item_name, tier, quantity
            FROM project_items
            WHERE project_id = ?1
            ORDER BY project_item_id ASC
            "#,
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_project_items", e))?;

        let items = item_rows
            .iter()
            .map(|r| {
                Ok(ProjectItem {
                    item_name: stored_name(r.try_get("item_name")?)?,
                    tier: r.try_get("tier")?,
                    quantity: r.try_get("quantity")?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        project_from_row(&row, items)
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("DELETE FROM project_items WHERE project_id = ?1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_project_items", e))?;
        let result = sqlx::query("DELETE FROM projects WHERE project_id = ?1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_project", e))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound(format!("project {id}")));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    async fn memory_store() -> SqliteCraftingStore {
        SqliteCraftingStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn sqlite_store_satisfies_the_contract() {
        contract::run_all(&memory_store().await).await;
    }

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent() {
        let store = memory_store().await;
        let again = SqliteCraftingStore::from_pool(store.pool().clone()).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn deleting_a_recipe_removes_its_ingredients() {
        let store = memory_store().await;
        let recipe = store.add_recipe(contract::plank_recipe()).await.unwrap();
        store.delete_recipe(recipe.id_typed()).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn blank_stored_name_is_reported_as_corrupt() {
        let store = memory_store().await;
        sqlx::query(
            "INSERT INTO inventory (item_name, tier, quantity, category) VALUES ('  ', 'I', 0, 'Misc')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let err = store.list_inventory().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn bad_recipe_rows_fail_only_their_own_nodes() {
        let store = memory_store().await;
        let plank = store.add_recipe(contract::plank_recipe()).await.unwrap();
        store.add_recipe(contract::chair_recipe()).await.unwrap();
        sqlx::query("UPDATE ingredients SET input_item = '  ' WHERE recipe_id = ?1")
            .bind(plank.id_typed().get())
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO recipes (recipe_name, output_item, output_qty, is_shaped, notes) VALUES ('Ghost', ' ', 1, 0, '')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let err = store.list_recipes().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));

        let book = store.recipe_book().await.unwrap();
        assert_eq!(book.output_items(), &["Wooden Plank".to_string(), "Wooden Chair".to_string()]);

        let report = crafter_planner::Expander::new(book)
            .expand(&crafter_planner::ExpandRequest::new("Wooden Chair", 2))
            .unwrap();
        assert_eq!(report.shopping_list.get("Nail"), Some(&8));
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Wooden Plank: error processing Wooden Plank: recipe"));
    }

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://shared?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://data/crafter.db?mode=rwc"));
    }
}
