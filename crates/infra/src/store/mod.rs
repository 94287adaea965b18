//! Crafting data store boundary.
//!
//! [`CraftingStore`] is the repository the HTTP layer talks to. The planner
//! never sees it directly: it receives a [`crafter_planner::RecipeBook`]
//! snapshot taken through [`CraftingStore::recipe_book`].

pub mod in_memory;
mod schema;
pub mod sqlite;
pub mod r#trait;

#[cfg(test)]
mod contract;

pub use in_memory::InMemoryCraftingStore;
pub use r#trait::{CraftingStore, StoreError, StoreResult};
pub use sqlite::SqliteCraftingStore;
