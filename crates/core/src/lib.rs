//! `crafter-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the inventory,
//! recipe, project and planner crates (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{required_text, DomainError, DomainResult};
pub use id::{ProjectId, RecipeId};
pub use value_object::ItemName;
