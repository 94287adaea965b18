//! Behaviour every `CraftingStore` implementation must share.

use crafter_core::{ProjectId, RecipeId};
use crafter_inventory::{InventoryKey, NewInventoryItem};
use crafter_planner::{ExpandRequest, Expander};
use crafter_projects::{NewProject, NewProjectItem, ValidProject};
use crafter_recipes::{NewIngredient, NewRecipe, ValidRecipe};

use super::{CraftingStore, StoreError};

pub(crate) fn plank_recipe() -> ValidRecipe {
    NewRecipe {
        recipe_name: "Wooden Plank".to_string(),
        output_item: "Wooden Plank".to_string(),
        output_qty: 4,
        is_shaped: false,
        notes: None,
        ingredients: vec![NewIngredient {
            input_item: "Rough Wood Trunk".to_string(),
            quantity: 1,
        }],
    }
    .validate()
    .unwrap()
}

pub(crate) fn chair_recipe() -> ValidRecipe {
    NewRecipe {
        recipe_name: "Wooden Chair".to_string(),
        output_item: "Wooden Chair".to_string(),
        output_qty: 1,
        is_shaped: true,
        notes: Some("workbench".to_string()),
        ingredients: vec![
            NewIngredient {
                input_item: "Wooden Plank".to_string(),
                quantity: 2,
            },
            NewIngredient {
                input_item: "Nail".to_string(),
                quantity: 4,
            },
        ],
    }
    .validate()
    .unwrap()
}

fn furnish_project() -> ValidProject {
    NewProject {
        name: "Furnish the hut".to_string(),
        description: Some("chairs first".to_string()),
        items: vec![
            NewProjectItem {
                item_name: "Wooden Chair".to_string(),
                tier: Some("I".to_string()),
                quantity: 2,
            },
            NewProjectItem {
                item_name: "Nail".to_string(),
                tier: None,
                quantity: 10,
            },
        ],
    }
    .validate()
    .unwrap()
}

pub(crate) async fn run_all<S: CraftingStore>(store: &S) {
    inventory_lifecycle(store).await;
    recipes_round_trip_in_order(store).await;
    recipe_book_drives_expansion(store).await;
    projects_lifecycle(store).await;
}

async fn inventory_lifecycle<S: CraftingStore>(store: &S) {
    let item = NewInventoryItem {
        name: "Nail".to_string(),
        tier: "I".to_string(),
        category: "Metal".to_string(),
        is_craftable: true,
        source: None,
        notes: Some("buy in bulk".to_string()),
    }
    .validate()
    .unwrap();
    let key = item.key().clone();

    store.add_inventory_item(item.clone()).await.unwrap();
    assert!(matches!(
        store.add_inventory_item(item).await,
        Err(StoreError::Conflict(_))
    ));

    let updated = store.set_inventory_quantity(&key, 40).await.unwrap();
    assert_eq!(updated.quantity(), 40);
    assert!(matches!(
        store.set_inventory_quantity(&key, -1).await,
        Err(StoreError::Validation(_))
    ));

    let adjusted = store.adjust_inventory_quantity(&key, -15).await.unwrap();
    assert_eq!(adjusted.quantity(), 25);
    assert!(matches!(
        store.adjust_inventory_quantity(&key, -26).await,
        Err(StoreError::Validation(_))
    ));
    let restored = store.adjust_inventory_quantity(&key, 15).await.unwrap();
    assert_eq!(restored.quantity(), 40);

    let listed = store.list_inventory().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].quantity(), 40);
    assert_eq!(listed[0].notes(), "buy in bulk");
    assert!(listed[0].is_craftable());

    let missing = InventoryKey::new("Nail", "II").unwrap();
    assert!(matches!(
        store.set_inventory_quantity(&missing, 1).await,
        Err(StoreError::NotFound(_))
    ));

    store.delete_inventory_item(&key).await.unwrap();
    assert!(store.list_inventory().await.unwrap().is_empty());
    assert!(matches!(
        store.delete_inventory_item(&key).await,
        Err(StoreError::NotFound(_))
    ));
}

async fn recipes_round_trip_in_order<S: CraftingStore>(store: &S) {
    let plank = store.add_recipe(plank_recipe()).await.unwrap();
    let chair = store.add_recipe(chair_recipe()).await.unwrap();
    assert!(chair.id_typed() > plank.id_typed());

    assert!(matches!(
        store.add_recipe(plank_recipe()).await,
        Err(StoreError::Conflict(_))
    ));

    let recipes = store.list_recipes().await.unwrap();
    let names: Vec<&str> = recipes.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Wooden Plank", "Wooden Chair"]);

    let stored_chair = &recipes[1];
    assert!(stored_chair.is_shaped());
    assert_eq!(stored_chair.notes(), "workbench");
    let inputs: Vec<(&str, i64)> = stored_chair
        .ingredients()
        .iter()
        .map(|i| (i.input_item.as_str(), i.quantity))
        .collect();
    assert_eq!(inputs, vec![("Wooden Plank", 2), ("Nail", 4)]);

    assert!(matches!(
        store.delete_recipe(RecipeId::new(9_999)).await,
        Err(StoreError::NotFound(_))
    ));
}

async fn recipe_book_drives_expansion<S: CraftingStore>(store: &S) {
    let book = store.recipe_book().await.unwrap();
    assert_eq!(book.output_items(), &["Wooden Plank".to_string(), "Wooden Chair".to_string()]);

    let report = Expander::new(book)
        .expand(&ExpandRequest::new("Wooden Chair", 2))
        .unwrap();
    assert_eq!(report.shopping_list.get("Nail"), Some(&8));
    assert_eq!(report.shopping_list.get("Rough Wood Trunk"), Some(&1));

    for recipe in store.list_recipes().await.unwrap() {
        store.delete_recipe(recipe.id_typed()).await.unwrap();
    }
    assert!(store.recipe_book().await.unwrap().is_empty());
}

async fn projects_lifecycle<S: CraftingStore>(store: &S) {
    let created = store.create_project(furnish_project()).await.unwrap();

    let fetched = store.get_project(created.id_typed()).await.unwrap();
    assert_eq!(fetched.name(), "Furnish the hut");
    assert_eq!(fetched.description(), "chairs first");
    let items: Vec<(&str, &str, i64)> = fetched
        .items()
        .iter()
        .map(|i| (i.item_name.as_str(), i.tier.as_str(), i.quantity))
        .collect();
    assert_eq!(items, vec![("Wooden Chair", "I", 2), ("Nail", "", 10)]);

    let summaries = store.list_projects().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].items().is_empty());
    assert_eq!(summaries[0].id_typed(), created.id_typed());

    store.delete_project(created.id_typed()).await.unwrap();
    assert!(matches!(
        store.get_project(created.id_typed()).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.delete_project(ProjectId::new(9_999)).await,
        Err(StoreError::NotFound(_))
    ));
}
