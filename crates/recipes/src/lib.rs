//! Recipes domain module.
//!
//! A recipe turns an ordered list of ingredients into a fixed output quantity
//! of exactly one item. This crate holds the validation rules only (no IO, no
//! HTTP, no storage).

pub mod recipe;

pub use recipe::{Ingredient, NewIngredient, NewRecipe, Recipe, ValidRecipe};
