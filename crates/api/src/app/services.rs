use std::sync::Arc;

use crafter_infra::{
    CraftingStore, InMemoryCraftingStore, SqliteCraftingStore, StoreError, StoreResult,
};
use crafter_planner::{Expander, RecipeBook};

use crate::config::{AppConfig, StoreKind};

/// Everything a request handler needs, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn CraftingStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn CraftingStore>) -> Self {
        Self { store }
    }

    /// Services backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryCraftingStore::arc())
    }

    pub fn store(&self) -> &dyn CraftingStore {
        self.store.as_ref()
    }

    /// An expander over a snapshot of the recipes as they are right now.
    pub async fn expander(&self) -> StoreResult<Expander<RecipeBook>> {
        let book = self.store.recipe_book().await?;
        tracing::debug!(recipes = book.len(), "recipe book loaded");
        Ok(Expander::new(book))
    }
}

/// Build the store selected by the configuration.
pub async fn build_services(config: &AppConfig) -> Result<Arc<AppServices>, StoreError> {
    let store: Arc<dyn CraftingStore> = match config.store {
        StoreKind::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            InMemoryCraftingStore::arc()
        }
        StoreKind::Sqlite => Arc::new(SqliteCraftingStore::connect(&config.database_url).await?),
    };
    Ok(Arc::new(AppServices::new(store)))
}
