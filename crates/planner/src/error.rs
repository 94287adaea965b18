//! Planner error model.
//!
//! Only [`InvalidRequest`] ever escapes an expansion call. Everything that goes
//! wrong inside the recipe graph is an [`ExpansionError`] recorded on the node
//! where it happened.

use thiserror::Error;

use crate::store::StoreReadError;

/// Node-local failure recorded in the `error` field of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    /// The item already appears on its own ancestor path.
    #[error("circular dependency for {item}")]
    CircularDependency { item: String },

    /// The recipe store failed while answering a lookup for this node.
    #[error("error processing {item}: {source}")]
    StoreRead {
        item: String,
        #[source]
        source: StoreReadError,
    },

    /// Stored recipe data cannot be scaled (non-positive or overflowing quantities).
    #[error("error processing {item}: invalid recipe data: {reason}")]
    InvalidRecipe { item: String, reason: String },
}

impl ExpansionError {
    pub fn circular(item: impl Into<String>) -> Self {
        Self::CircularDependency { item: item.into() }
    }

    pub fn store_read(item: impl Into<String>, source: StoreReadError) -> Self {
        Self::StoreRead {
            item: item.into(),
            source,
        }
    }

    pub fn invalid_recipe(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecipe {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

/// Caller contract violation at the root of an expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequest {
    #[error("item name cannot be empty")]
    EmptyItemName,

    #[error("quantity must be positive (got {0})")]
    NonPositiveQuantity(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_tree_error_field() {
        assert_eq!(
            ExpansionError::circular("Wooden Chair").to_string(),
            "circular dependency for Wooden Chair"
        );
        assert_eq!(
            ExpansionError::store_read("Nail", StoreReadError::new("disk I/O error")).to_string(),
            "error processing Nail: disk I/O error"
        );
        assert_eq!(
            InvalidRequest::NonPositiveQuantity(0).to_string(),
            "quantity must be positive (got 0)"
        );
    }
}
