//! Bill-of-materials planning for crafting recipes.
//!
//! The [`Expander`] walks the recipe graph from a target item down to base
//! materials, scaling every recipe by whole runs, and [`flatten`] turns the
//! resulting tree into a shopping list. Both are pure and synchronous: the
//! only collaborator is a read-only [`RecipeStore`] handed in by the caller.

pub mod error;
pub mod expander;
pub mod flatten;
pub mod plan;
pub mod store;
pub mod tree;

pub use error::{ExpansionError, InvalidRequest};
pub use expander::{Ancestors, ExpandRequest, ExpansionReport, Expander};
pub use flatten::{flatten, Flattened, ShoppingList};
pub use plan::{PlannedItem, ProjectPlan};
pub use store::{IngredientLine, RecipeBook, RecipeRef, RecipeStore, StoreReadError};
pub use tree::{Ingredients, NodeOutcome, TreeNode};
