//! Recursive recipe-tree expansion.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crafter_core::ItemName;

use crate::error::{ExpansionError, InvalidRequest};
use crate::flatten::{flatten, Flattened, ShoppingList};
use crate::store::RecipeStore;
use crate::tree::{Ingredients, TreeNode};

/// Top-level expansion request.
///
/// The quantity is signed so that a negative value coming off the wire is
/// rejected as [`InvalidRequest`] instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandRequest {
    pub item_name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl ExpandRequest {
    pub fn new(item_name: impl Into<String>, quantity: i64) -> Self {
        Self {
            item_name: item_name.into(),
            quantity,
        }
    }

    pub fn validate(&self) -> Result<(ItemName, u64), InvalidRequest> {
        let item = ItemName::parse(&self.item_name).map_err(|_| InvalidRequest::EmptyItemName)?;
        let quantity = u64::try_from(self.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(InvalidRequest::NonPositiveQuantity(self.quantity))?;
        Ok((item, quantity))
    }
}

/// Result of expanding one request: the plan and its shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    pub tree: TreeNode,
    pub shopping_list: ShoppingList,
    pub errors: Vec<String>,
}

/// Items on the path from the expansion root to the node being expanded.
#[derive(Debug, Clone, Default)]
pub struct Ancestors {
    items: HashSet<String>,
}

impl Ancestors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn enter(&mut self, item: &str) {
        self.items.insert(item.to_string());
    }

    fn leave(&mut self, item: &str) {
        self.items.remove(item);
    }
}

impl<S: Into<String>> FromIterator<S> for Ancestors {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Recipe lookup for one node, fully resolved before any recursion happens.
struct ScaledRecipe {
    recipe_runs: u64,
    actual_output: u64,
    inputs: Vec<(String, u64)>,
}

/// Expands items into production trees using an injected recipe store.
#[derive(Debug, Clone)]
pub struct Expander<S> {
    store: S,
}

impl<S: RecipeStore> Expander<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate `request`, expand it and flatten the tree into a shopping list.
    pub fn expand(&self, request: &ExpandRequest) -> Result<ExpansionReport, InvalidRequest> {
        let (item, quantity) = request.validate()?;

        let span = debug_span!("expand", item = %item, quantity);
        let _guard = span.enter();

        let tree = self.expand_item(item.as_str(), quantity);
        let Flattened {
            shopping_list,
            errors,
        } = flatten(&tree, item.as_str());

        debug!(
            nodes = tree.node_count(),
            base_materials = shopping_list.len(),
            errors = errors.len(),
            "expansion finished"
        );

        Ok(ExpansionReport {
            tree,
            shopping_list,
            errors,
        })
    }

    /// Expand `item` from an empty ancestor path.
    pub fn expand_item(&self, item: &str, quantity: u64) -> TreeNode {
        let mut ancestors = Ancestors::new();
        self.expand_with(item, quantity, &mut ancestors)
    }

    /// Expand `item` below the given ancestor path.
    ///
    /// `ancestors` must not already contain `item` unless the caller wants the
    /// node reported as circular. It is left exactly as it was passed in.
    pub fn expand_with(&self, item: &str, quantity: u64, ancestors: &mut Ancestors) -> TreeNode {
        if ancestors.contains(item) {
            warn!(item, "circular recipe dependency");
            return TreeNode::failed(quantity, ExpansionError::circular(item));
        }

        let scaled = match self.scale_recipe(item, quantity) {
            Ok(Some(scaled)) => scaled,
            Ok(None) => return TreeNode::base(quantity),
            Err(error) => {
                warn!(item, %error, "recipe lookup failed");
                return TreeNode::failed(quantity, error);
            }
        };

        ancestors.enter(item);
        let mut ingredients = Ingredients::with_capacity(scaled.inputs.len());
        for (input, required) in scaled.inputs {
            let child = self.expand_with(&input, required, ancestors);
            ingredients.insert(input, child);
        }
        ancestors.leave(item);

        TreeNode::crafted(
            quantity,
            scaled.recipe_runs,
            scaled.actual_output,
            item,
            ingredients,
        )
    }

    /// Look up the producing recipe of `item` and scale it to `quantity`.
    fn scale_recipe(&self, item: &str, quantity: u64) -> Result<Option<ScaledRecipe>, ExpansionError> {
        let recipe = match self.store.find_recipe_by_output(item) {
            Ok(Some(recipe)) => recipe,
            Ok(None) => return Ok(None),
            Err(e) => return Err(ExpansionError::store_read(item, e)),
        };

        let output_qty = positive(recipe.output_qty).ok_or_else(|| {
            ExpansionError::invalid_recipe(
                item,
                format!("output quantity {} is not positive", recipe.output_qty),
            )
        })?;

        let recipe_runs = quantity.div_ceil(output_qty);
        let actual_output = recipe_runs
            .checked_mul(output_qty)
            .ok_or_else(|| ExpansionError::invalid_recipe(item, "actual output overflows"))?;

        let lines = self
            .store
            .ingredients(recipe.recipe_id)
            .map_err(|e| ExpansionError::store_read(item, e))?;

        let inputs = lines
            .into_iter()
            .map(|line| {
                let per_run = positive(line.quantity).ok_or_else(|| {
                    ExpansionError::invalid_recipe(
                        item,
                        format!(
                            "quantity {} of {} is not positive",
                            line.quantity, line.input_item
                        ),
                    )
                })?;
                let required = per_run.checked_mul(recipe_runs).ok_or_else(|| {
                    ExpansionError::invalid_recipe(
                        item,
                        format!("required quantity of {} overflows", line.input_item),
                    )
                })?;
                Ok((line.input_item, required))
            })
            .collect::<Result<Vec<_>, ExpansionError>>()?;

        Ok(Some(ScaledRecipe {
            recipe_runs,
            actual_output,
            inputs,
        }))
    }
}

fn positive(raw: i64) -> Option<u64> {
    u64::try_from(raw).ok().filter(|v| *v > 0)
}
