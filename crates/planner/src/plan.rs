//! Multi-item planning built on top of single-item expansion.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::flatten::{flatten, Flattened, ShoppingList};
use crate::store::{RecipeBook, RecipeStore};
use crate::tree::TreeNode;
use crate::Expander;

/// One target item of a project plan with its own tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedItem {
    pub item_name: String,
    pub quantity: u64,
    pub tree: TreeNode,
}

/// Trees for every target item plus the merged shopping list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectPlan {
    pub items: Vec<PlannedItem>,
    pub shopping_list: ShoppingList,
    pub errors: Vec<String>,
}

impl<S: RecipeStore> Expander<S> {
    /// Base materials needed for `quantity` of `item`, without the tree.
    pub fn required_materials(&self, item: &str, quantity: u64) -> Flattened {
        flatten(&self.expand_item(item, quantity), item)
    }

    /// Expand every `(item, quantity)` target and merge their shopping lists.
    pub fn plan_project<I, N>(&self, targets: I) -> ProjectPlan
    where
        I: IntoIterator<Item = (N, u64)>,
        N: Into<String>,
    {
        let mut merged = Flattened::default();
        let mut items = Vec::new();

        for (item_name, quantity) in targets {
            let item_name = item_name.into();
            let tree = self.expand_item(&item_name, quantity);
            merged.merge(flatten(&tree, &item_name));
            items.push(PlannedItem {
                item_name,
                quantity,
                tree,
            });
        }

        debug!(
            targets = items.len(),
            base_materials = merged.shopping_list.len(),
            errors = merged.errors.len(),
            "project planned"
        );

        ProjectPlan {
            items,
            shopping_list: merged.shopping_list,
            errors: merged.errors,
        }
    }

    /// Expand each listed item once at quantity 1.
    pub fn expand_catalog<I, N>(&self, items: I) -> BTreeMap<String, TreeNode>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        items
            .into_iter()
            .map(|item| {
                let item = item.into();
                let tree = self.expand_item(&item, 1);
                (item, tree)
            })
            .collect()
    }
}

impl Expander<RecipeBook> {
    /// Every craftable item in the book, expanded at quantity 1.
    pub fn catalog(&self) -> BTreeMap<String, TreeNode> {
        self.expand_catalog(self.store().output_items().iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crafter_core::{ItemName, RecipeId};
    use crafter_recipes::{Ingredient, Recipe};

    fn recipe(id: i64, output: &str, output_qty: i64, inputs: &[(&str, i64)]) -> Recipe {
        Recipe::rehydrate(
            RecipeId::new(id),
            output.to_string(),
            ItemName::parse(output).unwrap(),
            output_qty,
            false,
            String::new(),
            inputs
                .iter()
                .map(|(name, qty)| Ingredient {
                    input_item: ItemName::parse(name).unwrap(),
                    quantity: *qty,
                })
                .collect(),
        )
    }

    fn workshop() -> Expander<RecipeBook> {
        Expander::new(RecipeBook::new(vec![
            recipe(1, "Wooden Chair", 1, &[("Wooden Plank", 2), ("Nail", 4)]),
            recipe(2, "Wooden Plank", 4, &[("Rough Wood Trunk", 1)]),
            recipe(3, "Wooden Table", 1, &[("Wooden Plank", 6), ("Nail", 8)]),
        ]))
    }

    #[test]
    fn required_materials_matches_the_tree() {
        let flat = workshop().required_materials("Wooden Chair", 2);
        assert!(flat.is_clean());
        assert_eq!(flat.shopping_list.get("Nail"), Some(&8));
        assert_eq!(flat.shopping_list.get("Rough Wood Trunk"), Some(&1));
    }

    #[test]
    fn project_plan_sums_across_targets() {
        let plan = workshop().plan_project(vec![("Wooden Chair", 2), ("Wooden Table", 1)]);

        let names: Vec<&str> = plan.items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, vec!["Wooden Chair", "Wooden Table"]);
        // Chairs: 8 nails, 1 trunk. Table: 6 planks = 2 runs = 2 trunks, 8 nails.
        assert_eq!(plan.shopping_list.get("Nail"), Some(&16));
        assert_eq!(plan.shopping_list.get("Rough Wood Trunk"), Some(&3));
        assert!(plan.errors.is_empty());
    }

    #[test]
    fn project_plan_collects_errors_per_target() {
        let expander = Expander::new(RecipeBook::new(vec![
            recipe(1, "A", 1, &[("B", 1)]),
            recipe(2, "B", 1, &[("A", 1)]),
        ]));
        let plan = expander.plan_project(vec![("A", 1), ("Stone", 5)]);

        assert_eq!(plan.errors, vec!["A: circular dependency for A".to_string()]);
        assert_eq!(plan.shopping_list.get("Stone"), Some(&5));
    }

    #[test]
    fn huge_request_with_shared_base_material_does_not_panic() {
        let expander = Expander::new(RecipeBook::new(vec![
            recipe(1, "X", 1, &[("A", 1), ("B", 1)]),
            recipe(2, "A", 1, &[("Ore", 2)]),
            recipe(3, "B", 1, &[("Ore", 2)]),
        ]));

        let report = expander
            .expand(&crate::ExpandRequest::new("X", i64::MAX))
            .unwrap();

        assert_eq!(report.shopping_list.get("Ore"), Some(&u64::MAX));
        assert_eq!(report.errors, vec!["Ore: shopping list total overflows".to_string()]);
    }

    #[test]
    fn empty_project_has_empty_plan() {
        let plan = workshop().plan_project(Vec::<(String, u64)>::new());
        assert_eq!(plan, ProjectPlan::default());
    }

    #[test]
    fn catalog_expands_every_output_once() {
        let catalog = workshop().catalog();
        let keys: Vec<&str> = catalog.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Wooden Chair", "Wooden Plank", "Wooden Table"]);
        assert_eq!(catalog["Wooden Plank"].actual_output(), Some(4));
        assert_eq!(catalog["Wooden Chair"].quantity, 1);
    }
}
