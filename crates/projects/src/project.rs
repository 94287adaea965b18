use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crafter_core::{required_text, DomainError, DomainResult, ItemName, ProjectId};

/// A target item of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub item_name: ItemName,
    pub tier: String,
    pub quantity: i64,
}

/// A stored project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    items: Vec<ProjectItem>,
}

impl Project {
    pub fn rehydrate(
        id: ProjectId,
        name: String,
        description: String,
        created_at: DateTime<Utc>,
        items: Vec<ProjectItem>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
            items,
        }
    }

    pub fn id_typed(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn items(&self) -> &[ProjectItem] {
        &self.items
    }

    /// Summary view without the item list.
    pub fn without_items(&self) -> Self {
        Self {
            items: Vec::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProjectItem {
    pub item_name: String,
    #[serde(default)]
    pub tier: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<NewProjectItem>,
}

/// A validated project that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProject {
    pub name: String,
    pub description: String,
    pub items: Vec<ProjectItem>,
}

impl ValidProject {
    pub fn with_id(self, id: ProjectId, created_at: DateTime<Utc>) -> Project {
        Project::rehydrate(id, self.name, self.description, created_at, self.items)
    }
}

impl NewProject {
    pub fn validate(self) -> DomainResult<ValidProject> {
        let name = required_text("project name", &self.name)?;

        let items = self
            .items
            .into_iter()
            .map(|line| {
                let item_name = ItemName::parse(&line.item_name)?;
                if line.quantity <= 0 {
                    return Err(DomainError::validation(format!(
                        "quantity for {item_name} must be positive"
                    )));
                }
                Ok(ProjectItem {
                    item_name,
                    tier: line.tier.map(|t| t.trim().to_string()).unwrap_or_default(),
                    quantity: line.quantity,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(ValidProject {
            name,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            items,
        })
    }
}
