//! Infrastructure layer: persistence of inventory, recipes and projects.

pub mod store;

pub use store::{
    CraftingStore, InMemoryCraftingStore, SqliteCraftingStore, StoreError, StoreResult,
};
