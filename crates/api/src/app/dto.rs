use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crafter_planner::{PlannedItem, ProjectPlan, ShoppingList};
use crafter_projects::Project;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Either an absolute stock level or a relative change, never both.
#[derive(Debug, Deserialize)]
pub struct UpdateInventoryRequest {
    pub quantity: Option<i64>,
    pub delta: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    Set(i64),
    Adjust(i64),
}

impl UpdateInventoryRequest {
    pub fn into_change(self) -> Result<StockChange, axum::response::Response> {
        match (self.quantity, self.delta) {
            (Some(quantity), None) => Ok(StockChange::Set(quantity)),
            (None, Some(delta)) => Ok(StockChange::Adjust(delta)),
            _ => Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "provide exactly one of quantity or delta",
            )),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// A project with the expansion of every target item.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub trees: Vec<PlannedItem>,
    pub shopping_list: ShoppingList,
    pub errors: Vec<String>,
}

impl ProjectDetail {
    pub fn new(project: Project, plan: ProjectPlan, mut skipped: Vec<String>) -> Self {
        skipped.extend(plan.errors);
        Self {
            project,
            trees: plan.items,
            shopping_list: plan.shopping_list,
            errors: skipped,
        }
    }
}

// -------------------------
// Mapping helpers
// -------------------------

/// Expansion targets of a project. Items whose stored quantity is not positive
/// are skipped and reported.
pub fn project_targets(project: &Project) -> (Vec<(String, u64)>, Vec<String>) {
    let mut targets = Vec::with_capacity(project.items().len());
    let mut skipped = Vec::new();

    for item in project.items() {
        match u64::try_from(item.quantity) {
            Ok(quantity) if quantity > 0 => {
                targets.push((item.item_name.as_str().to_string(), quantity))
            }
            _ => skipped.push(format!(
                "{}: quantity {} is not positive",
                item.item_name, item.quantity
            )),
        }
    }

    (targets, skipped)
}
