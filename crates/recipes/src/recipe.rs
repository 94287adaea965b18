use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crafter_core::{required_text, DomainError, DomainResult, ItemName, RecipeId};

/// One input line of a recipe: `quantity` units of `input_item` per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub input_item: ItemName,
    pub quantity: i64,
}

/// A stored recipe.
///
/// Quantities are kept as the signed integers the store hands back; only
/// [`NewRecipe::validate`] guarantees they are positive. Consumers that read
/// recipes from storage must not assume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    id: RecipeId,
    name: String,
    output_item: ItemName,
    output_qty: i64,
    is_shaped: bool,
    notes: String,
    ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn rehydrate(
        id: RecipeId,
        name: String,
        output_item: ItemName,
        output_qty: i64,
        is_shaped: bool,
        notes: String,
        ingredients: Vec<Ingredient>,
    ) -> Self {
        Self {
            id,
            name,
            output_item,
            output_qty,
            is_shaped,
            notes,
            ingredients,
        }
    }

    pub fn id_typed(&self) -> RecipeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_item(&self) -> &ItemName {
        &self.output_item
    }

    pub fn output_qty(&self) -> i64 {
        self.output_qty
    }

    pub fn is_shaped(&self) -> bool {
        self.is_shaped
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIngredient {
    pub input_item: String,
    pub quantity: i64,
}

/// Request to register a recipe together with its ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub recipe_name: String,
    pub output_item: String,
    pub output_qty: i64,
    #[serde(default)]
    pub is_shaped: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<NewIngredient>,
}

/// A validated recipe that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecipe {
    pub name: String,
    pub output_item: ItemName,
    pub output_qty: i64,
    pub is_shaped: bool,
    pub notes: String,
    pub ingredients: Vec<Ingredient>,
}

impl ValidRecipe {
    pub fn with_id(self, id: RecipeId) -> Recipe {
        Recipe::rehydrate(
            id,
            self.name,
            self.output_item,
            self.output_qty,
            self.is_shaped,
            self.notes,
            self.ingredients,
        )
    }
}

impl NewRecipe {
    pub fn validate(self) -> DomainResult<ValidRecipe> {
        let name = required_text("recipe name", &self.recipe_name)?;
        let output_item = ItemName::parse(&self.output_item)?;

        if self.output_qty <= 0 {
            return Err(DomainError::validation("output quantity must be positive"));
        }

        let mut seen = HashSet::new();
        let mut ingredients = Vec::with_capacity(self.ingredients.len());
        for line in self.ingredients {
            let input_item = ItemName::parse(&line.input_item)?;
            if line.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "ingredient quantity for {input_item} must be positive"
                )));
            }
            // The expansion tree keys children by input item; a repeated
            // ingredient would silently overwrite its sibling.
            if !seen.insert(input_item.clone()) {
                return Err(DomainError::validation(format!(
                    "ingredient {input_item} listed more than once"
                )));
            }
            ingredients.push(Ingredient {
                input_item,
                quantity: line.quantity,
            });
        }

        Ok(ValidRecipe {
            name,
            output_item,
            output_qty: self.output_qty,
            is_shaped: self.is_shaped,
            notes: self.notes.map(|n| n.trim().to_string()).unwrap_or_default(),
            ingredients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plank_recipe() -> NewRecipe {
        NewRecipe {
            recipe_name: "Wooden Plank".to_string(),
            output_item: " Wooden Plank".to_string(),
            output_qty: 4,
            is_shaped: false,
            notes: Some(" sawmill ".to_string()),
            ingredients: vec![NewIngredient {
                input_item: "Rough Wood Trunk ".to_string(),
                quantity: 1,
            }],
        }
    }

    #[test]
    fn validate_trims_names_and_keeps_order() {
        let mut req = plank_recipe();
        req.ingredients.push(NewIngredient {
            input_item: "Glue".to_string(),
            quantity: 2,
        });

        let valid = req.validate().unwrap();
        assert_eq!(valid.output_item.as_str(), "Wooden Plank");
        assert_eq!(valid.notes, "sawmill");
        let inputs: Vec<&str> = valid.ingredients.iter().map(|i| i.input_item.as_str()).collect();
        assert_eq!(inputs, vec!["Rough Wood Trunk", "Glue"]);
    }

    #[test]
    fn recipe_without_ingredients_is_allowed() {
        let mut req = plank_recipe();
        req.ingredients.clear();
        let recipe = req.validate().unwrap().with_id(RecipeId::new(7));
        assert_eq!(recipe.id_typed(), RecipeId::new(7));
        assert!(recipe.ingredients().is_empty());
    }

    #[test]
    fn non_positive_output_quantity_is_rejected() {
        for qty in [0, -4] {
            let mut req = plank_recipe();
            req.output_qty = qty;
            assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
        }
    }

    #[test]
    fn non_positive_ingredient_quantity_is_rejected() {
        let mut req = plank_recipe();
        req.ingredients[0].quantity = 0;
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn duplicated_ingredient_is_rejected() {
        let mut req = plank_recipe();
        req.ingredients.push(NewIngredient {
            input_item: "Rough Wood Trunk".to_string(),
            quantity: 3,
        });
        match req.validate() {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("more than once")),
            other => panic!("expected duplicate ingredient error, got {other:?}"),
        }
    }

    #[test]
    fn request_defaults_optional_fields() {
        let req: NewRecipe = serde_json::from_value(serde_json::json!({
            "recipe_name": "Nail",
            "output_item": "Nail",
            "output_qty": 10,
        }))
        .unwrap();
        assert!(!req.is_shaped);
        assert!(req.ingredients.is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: validation is deterministic and never reorders ingredients.
            #[test]
            fn validation_preserves_ingredient_order(
                qtys in proptest::collection::vec(1i64..100, 1..10),
                output_qty in 1i64..64,
            ) {
                let req = NewRecipe {
                    recipe_name: "Thing".to_string(),
                    output_item: "Thing".to_string(),
                    output_qty,
                    is_shaped: true,
                    notes: None,
                    ingredients: qtys
                        .iter()
                        .enumerate()
                        .map(|(i, q)| NewIngredient { input_item: format!("Part {i}"), quantity: *q })
                        .collect(),
                };

                let a = req.clone().validate().unwrap();
                let b = req.validate().unwrap();
                prop_assert_eq!(&a, &b);
                for (i, line) in a.ingredients.iter().enumerate() {
                    prop_assert_eq!(line.input_item.as_str(), format!("Part {i}"));
                    prop_assert_eq!(line.quantity, qtys[i]);
                }
            }
        }
    }
}
