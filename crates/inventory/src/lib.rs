//! Inventory domain module.
//!
//! This crate contains business rules for the crafting inventory, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;

pub use item::{InventoryItem, InventoryKey, NewInventoryItem};
