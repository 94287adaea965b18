//! Shopping-list flattening of an expanded tree.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::tree::TreeNode;

/// Base material name -> total quantity needed.
pub type ShoppingList = BTreeMap<String, u64>;

/// Output of [`flatten`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Flattened {
    pub shopping_list: ShoppingList,
    pub errors: Vec<String>,
}

impl Flattened {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add another result into this one, summing shared base materials.
    pub fn merge(&mut self, other: Flattened) {
        for (item, quantity) in other.shopping_list {
            self.charge(&item, quantity);
        }
        self.errors.extend(other.errors);
    }

    /// Add `quantity` to `item`'s total. A total that would not fit in a
    /// `u64` is pinned at `u64::MAX` and reported in `errors`.
    fn charge(&mut self, item: &str, quantity: u64) {
        let total = self.shopping_list.entry(item.to_string()).or_default();
        match total.checked_add(quantity) {
            Some(sum) => *total = sum,
            None => {
                *total = u64::MAX;
                self.errors.push(format!("{item}: shopping list total overflows"));
            }
        }
    }

    /// The bare map when there are no errors, else both parts.
    pub fn into_legacy_json(self) -> Value {
        if self.errors.is_empty() {
            json!(self.shopping_list)
        } else {
            json!({
                "shopping_list": self.shopping_list,
                "errors": self.errors,
            })
        }
    }
}

/// Collect base-material totals and node errors from `root`.
///
/// `root_label` is the name charged for the root itself when it is a leaf and
/// the prefix of its error, if any.
pub fn flatten(root: &TreeNode, root_label: &str) -> Flattened {
    let mut out = Flattened::default();
    walk(root, root_label, &mut out);
    out
}

fn walk(node: &TreeNode, label: &str, out: &mut Flattened) {
    if let Some(error) = node.error() {
        out.errors.push(format!("{label}: {error}"));
        return;
    }

    if node.is_base_material() || node.ingredients.is_empty() {
        out.charge(label, node.quantity);
        return;
    }

    for (item, child) in node.ingredients.iter() {
        walk(child, item, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExpansionError;
    use crate::tree::Ingredients;

    fn crafted(quantity: u64, produced_by: &str, children: Vec<(&str, TreeNode)>) -> TreeNode {
        let mut ingredients = Ingredients::default();
        for (item, node) in children {
            ingredients.insert(item, node);
        }
        TreeNode::crafted(quantity, quantity, quantity, produced_by, ingredients)
    }

    #[test]
    fn same_base_item_on_two_branches_is_summed() {
        let tree = crafted(
            1,
            "Cabinet",
            vec![
                ("Door", crafted(1, "Door", vec![("Plank", TreeNode::base(5))])),
                ("Shelf", crafted(1, "Shelf", vec![("Plank", TreeNode::base(3))])),
            ],
        );

        let flat = flatten(&tree, "Cabinet");
        assert!(flat.is_clean());
        assert_eq!(flat.shopping_list.get("Plank"), Some(&8));
        assert_eq!(flat.shopping_list.len(), 1);
    }

    #[test]
    fn base_root_is_charged_under_its_label() {
        let flat = flatten(&TreeNode::base(12), "Nail");
        assert_eq!(flat.shopping_list.get("Nail"), Some(&12));
    }

    #[test]
    fn recipe_without_ingredients_counts_as_a_leaf() {
        let tree = crafted(2, "Water", vec![]);
        let flat = flatten(&tree, "Water");
        assert_eq!(flat.shopping_list.get("Water"), Some(&2));
    }

    #[test]
    fn error_nodes_are_reported_and_not_descended() {
        let tree = crafted(
            1,
            "A",
            vec![
                ("B", TreeNode::failed(2, ExpansionError::circular("B"))),
                ("Ore", TreeNode::base(4)),
            ],
        );

        let flat = flatten(&tree, "A");
        assert_eq!(flat.errors, vec!["B: circular dependency for B".to_string()]);
        assert_eq!(flat.shopping_list.get("B"), None);
        assert_eq!(flat.shopping_list.get("Ore"), Some(&4));
    }

    #[test]
    fn failed_root_uses_the_root_label() {
        let tree = TreeNode::failed(1, ExpansionError::circular("X"));
        let flat = flatten(&tree, "X");
        assert!(flat.shopping_list.is_empty());
        assert_eq!(flat.errors, vec!["X: circular dependency for X".to_string()]);
    }

    #[test]
    fn merge_sums_and_appends() {
        let mut a = flatten(&crafted(1, "A", vec![("Ore", TreeNode::base(2))]), "A");
        let b = flatten(
            &crafted(
                1,
                "B",
                vec![
                    ("Ore", TreeNode::base(3)),
                    ("C", TreeNode::failed(1, ExpansionError::circular("C"))),
                ],
            ),
            "B",
        );
        a.merge(b);
        assert_eq!(a.shopping_list.get("Ore"), Some(&5));
        assert_eq!(a.errors.len(), 1);
    }

    #[test]
    fn overflowing_total_is_reported_instead_of_wrapping() {
        let tree = crafted(
            1,
            "X",
            vec![
                ("A", crafted(1, "A", vec![("Ore", TreeNode::base(u64::MAX - 1))])),
                ("B", crafted(1, "B", vec![("Ore", TreeNode::base(2))])),
            ],
        );

        let flat = flatten(&tree, "X");
        assert_eq!(flat.shopping_list.get("Ore"), Some(&u64::MAX));
        assert_eq!(flat.errors, vec!["Ore: shopping list total overflows".to_string()]);
    }

    #[test]
    fn merge_reports_overflow() {
        let mut a = flatten(&TreeNode::base(u64::MAX), "Ore");
        a.merge(flatten(&TreeNode::base(1), "Ore"));
        assert_eq!(a.shopping_list.get("Ore"), Some(&u64::MAX));
        assert_eq!(a.errors.len(), 1);
    }

    #[test]
    fn legacy_json_is_bare_map_only_when_clean() {
        let clean = flatten(&TreeNode::base(3), "Nail");
        assert_eq!(clean.into_legacy_json(), json!({"Nail": 3}));

        let dirty = flatten(&TreeNode::failed(1, ExpansionError::circular("A")), "A");
        assert_eq!(
            dirty.into_legacy_json(),
            json!({"shopping_list": {}, "errors": ["A: circular dependency for A"]})
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_tree() -> impl Strategy<Value = TreeNode> {
            let leaf = prop_oneof![
                (1u64..1_000).prop_map(TreeNode::base),
                (1u64..1_000).prop_map(|q| TreeNode::failed(q, ExpansionError::circular("Loop"))),
            ];
            leaf.prop_recursive(4, 64, 5, |inner| {
                (
                    1u64..100,
                    proptest::collection::vec(("[A-E]", inner), 1..5),
                )
                    .prop_map(|(q, children)| {
                        let mut ingredients = Ingredients::default();
                        for (item, node) in children {
                            ingredients.insert(item, node);
                        }
                        TreeNode::crafted(q, q, q, "Parent", ingredients)
                    })
            })
        }

        fn leaf_sum(node: &TreeNode) -> u64 {
            if node.error().is_some() {
                0
            } else if node.ingredients.is_empty() {
                node.quantity
            } else {
                node.ingredients.iter().map(|(_, c)| leaf_sum(c)).sum()
            }
        }

        proptest! {
            /// Property: flattening the same tree twice gives identical output.
            #[test]
            fn flatten_is_idempotent(tree in arb_tree()) {
                let first = flatten(&tree, "Root");
                let second = flatten(&tree, "Root");
                prop_assert_eq!(first, second);
            }

            /// Property: the shopping list total equals the sum of error-free leaves.
            #[test]
            fn total_equals_leaf_sum(tree in arb_tree()) {
                let flat = flatten(&tree, "Root");
                let total: u64 = flat.shopping_list.values().sum();
                prop_assert_eq!(total, leaf_sum(&tree));
            }
        }
    }
}
