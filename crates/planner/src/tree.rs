//! Production plan tree produced by one expansion call.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ExpansionError;

/// How a node's requested quantity is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    /// No recipe produces the item; it has to be gathered or bought.
    Base,
    /// Produced by running the item's recipe `recipe_runs` times.
    Crafted {
        recipe_runs: u64,
        actual_output: u64,
        produced_by: String,
    },
    /// Expansion stopped at this node.
    Failed(ExpansionError),
}

/// Plan for one `(item, requested quantity)` pair.
///
/// The item name itself is the key under which the node is stored in its
/// parent (or the label the caller passes for the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub quantity: u64,
    pub outcome: NodeOutcome,
    pub ingredients: Ingredients,
}

impl TreeNode {
    pub fn base(quantity: u64) -> Self {
        Self {
            quantity,
            outcome: NodeOutcome::Base,
            ingredients: Ingredients::default(),
        }
    }

    pub fn failed(quantity: u64, error: ExpansionError) -> Self {
        Self {
            quantity,
            outcome: NodeOutcome::Failed(error),
            ingredients: Ingredients::default(),
        }
    }

    pub fn crafted(
        quantity: u64,
        recipe_runs: u64,
        actual_output: u64,
        produced_by: impl Into<String>,
        ingredients: Ingredients,
    ) -> Self {
        Self {
            quantity,
            outcome: NodeOutcome::Crafted {
                recipe_runs,
                actual_output,
                produced_by: produced_by.into(),
            },
            ingredients,
        }
    }

    pub fn is_base_material(&self) -> bool {
        matches!(self.outcome, NodeOutcome::Base)
    }

    pub fn error(&self) -> Option<&ExpansionError> {
        match &self.outcome {
            NodeOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn recipe_runs(&self) -> Option<u64> {
        match self.outcome {
            NodeOutcome::Crafted { recipe_runs, .. } => Some(recipe_runs),
            _ => None,
        }
    }

    pub fn actual_output(&self) -> Option<u64> {
        match self.outcome {
            NodeOutcome::Crafted { actual_output, .. } => Some(actual_output),
            _ => None,
        }
    }

    pub fn produced_by(&self) -> Option<&str> {
        match &self.outcome {
            NodeOutcome::Crafted { produced_by, .. } => Some(produced_by),
            _ => None,
        }
    }

    pub fn child(&self, item: &str) -> Option<&TreeNode> {
        self.ingredients.get(item)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .ingredients
            .iter()
            .map(|(_, child)| child.node_count())
            .sum::<usize>()
    }
}

/// Children of a node keyed by input item, in recipe order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingredients(Vec<(String, TreeNode)>);

impl Ingredients {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Insert a child. A repeated key replaces the earlier child in place.
    pub fn insert(&mut self, item: impl Into<String>, node: TreeNode) {
        let item = item.into();
        match self.0.iter_mut().find(|(k, _)| *k == item) {
            Some((_, slot)) => *slot = node,
            None => self.0.push((item, node)),
        }
    }

    pub fn get(&self, item: &str) -> Option<&TreeNode> {
        self.0.iter().find(|(k, _)| k == item).map(|(_, n)| n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.0.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Ingredients {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (item, node) in &self.0 {
            map.serialize_entry(item, node)?;
        }
        map.end()
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("quantity", &self.quantity)?;
        match &self.outcome {
            NodeOutcome::Base => {
                map.serialize_entry("produced_by", &Option::<&str>::None)?;
                map.serialize_entry("ingredients", &self.ingredients)?;
                map.serialize_entry("is_base_material", &true)?;
            }
            NodeOutcome::Crafted {
                recipe_runs,
                actual_output,
                produced_by,
            } => {
                map.serialize_entry("actual_output", actual_output)?;
                map.serialize_entry("recipe_runs", recipe_runs)?;
                map.serialize_entry("produced_by", produced_by)?;
                map.serialize_entry("ingredients", &self.ingredients)?;
                map.serialize_entry("is_base_material", &false)?;
            }
            NodeOutcome::Failed(error) => {
                map.serialize_entry("produced_by", &Option::<&str>::None)?;
                map.serialize_entry("ingredients", &self.ingredients)?;
                map.serialize_entry("error", &error.to_string())?;
            }
        }
        map.end()
    }
}
