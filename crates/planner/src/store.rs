//! Read-only recipe lookups consumed by the expander.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crafter_core::RecipeId;
use crafter_recipes::Recipe;

/// The producing recipe of an item, as far as expansion cares about it.
///
/// `output_qty` is the raw stored value; the expander rejects non-positive
/// values itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RecipeRef {
    pub recipe_id: RecipeId,
    pub output_qty: i64,
}

/// One `(input item, quantity per run)` pair of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub input_item: String,
    pub quantity: i64,
}

/// Failure of a single store lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreReadError {
    message: String,
}

impl StoreReadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Recipe lookup service.
///
/// Each call is independent and side-effect free; a failure for one item must
/// not poison lookups for other items.
pub trait RecipeStore {
    /// The recipe whose output is `item`, if any.
    fn find_recipe_by_output(&self, item: &str) -> Result<Option<RecipeRef>, StoreReadError>;

    /// Ingredients of a recipe, in recipe order.
    fn ingredients(&self, recipe_id: RecipeId) -> Result<Vec<IngredientLine>, StoreReadError>;
}

impl<S> RecipeStore for &S
where
    S: RecipeStore + ?Sized,
{
    fn find_recipe_by_output(&self, item: &str) -> Result<Option<RecipeRef>, StoreReadError> {
        (**self).find_recipe_by_output(item)
    }

    fn ingredients(&self, recipe_id: RecipeId) -> Result<Vec<IngredientLine>, StoreReadError> {
        (**self).ingredients(recipe_id)
    }
}

impl<S> RecipeStore for Arc<S>
where
    S: RecipeStore + ?Sized,
{
    fn find_recipe_by_output(&self, item: &str) -> Result<Option<RecipeRef>, StoreReadError> {
        (**self).find_recipe_by_output(item)
    }

    fn ingredients(&self, recipe_id: RecipeId) -> Result<Vec<IngredientLine>, StoreReadError> {
        (**self).ingredients(recipe_id)
    }
}

/// Immutable snapshot of every recipe, prefetched once per request.
///
/// When several recipes produce the same item the one with the lowest id wins.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    by_output: HashMap<String, RecipeRef>,
    ingredients: HashMap<RecipeId, Vec<IngredientLine>>,
    unreadable: HashMap<RecipeId, String>,
    outputs: Vec<String>,
}

impl RecipeBook {
    pub fn new(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let mut recipes: Vec<Recipe> = recipes.into_iter().collect();
        recipes.sort_by_key(|r| r.id_typed());

        let mut book = Self::default();
        for recipe in recipes {
            let output = recipe.output_item().as_str().to_string();
            if !book.by_output.contains_key(&output) {
                book.by_output.insert(
                    output.clone(),
                    RecipeRef {
                        recipe_id: recipe.id_typed(),
                        output_qty: recipe.output_qty(),
                    },
                );
                book.outputs.push(output);
            }

            let lines = recipe
                .ingredients()
                .iter()
                .map(|i| IngredientLine {
                    input_item: i.input_item.as_str().to_string(),
                    quantity: i.quantity,
                })
                .collect();
            book.ingredients.insert(recipe.id_typed(), lines);
        }
        book
    }

    /// Fail every ingredient lookup of `recipe_id` with `reason`, for recipes
    /// whose stored ingredient rows could not be decoded.
    pub fn mark_unreadable(&mut self, recipe_id: RecipeId, reason: impl Into<String>) {
        self.unreadable.insert(recipe_id, reason.into());
    }

    /// Distinct craftable items, ordered by the id of their producing recipe.
    pub fn output_items(&self) -> &[String] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

impl RecipeStore for RecipeBook {
    fn find_recipe_by_output(&self, item: &str) -> Result<Option<RecipeRef>, StoreReadError> {
        Ok(self.by_output.get(item).copied())
    }

    fn ingredients(&self, recipe_id: RecipeId) -> Result<Vec<IngredientLine>, StoreReadError> {
        if let Some(reason) = self.unreadable.get(&recipe_id) {
            return Err(StoreReadError::new(reason.clone()));
        }
        self.ingredients
            .get(&recipe_id)
            .cloned()
            .ok_or_else(|| StoreReadError::new(format!("unknown recipe id {recipe_id}")))
    }
}
