use serde::{Deserialize, Serialize};

use crafter_core::{required_text, DomainError, DomainResult, ItemName};

/// Inventory rows are keyed by item name and tier: the same item can be held
/// at several tiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InventoryKey {
    pub name: ItemName,
    pub tier: String,
}

impl InventoryKey {
    pub fn new(name: &str, tier: &str) -> DomainResult<Self> {
        Ok(Self {
            name: ItemName::parse(name)?,
            tier: required_text("tier", tier)?,
        })
    }
}

impl core::fmt::Display for InventoryKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (tier {})", self.name, self.tier)
    }
}

/// A stocked item, identified by its `(name, tier)` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    #[serde(flatten)]
    key: InventoryKey,
    quantity: i64,
    category: String,
    source: String,
    is_craftable: bool,
    notes: String,
}

/// Request to register a new inventory item. Stock always starts at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub tier: String,
    pub category: String,
    pub is_craftable: bool,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewInventoryItem {
    pub fn validate(self) -> DomainResult<InventoryItem> {
        let key = InventoryKey::new(&self.name, &self.tier)?;
        let category = required_text("category", &self.category)?;

        Ok(InventoryItem {
            key,
            quantity: 0,
            category,
            source: trimmed_or_empty(self.source),
            is_craftable: self.is_craftable,
            notes: trimmed_or_empty(self.notes),
        })
    }
}

fn trimmed_or_empty(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

impl InventoryItem {
    /// Rebuild an item from stored columns (no validation beyond the key).
    pub fn rehydrate(
        key: InventoryKey,
        quantity: i64,
        category: String,
        source: String,
        is_craftable: bool,
        notes: String,
    ) -> Self {
        Self {
            key,
            quantity,
            category,
            source,
            is_craftable,
            notes,
        }
    }

    pub fn key(&self) -> &InventoryKey {
        &self.key
    }

    pub fn name(&self) -> &ItemName {
        &self.key.name
    }

    pub fn tier(&self) -> &str {
        &self.key.tier
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_craftable(&self) -> bool {
        self.is_craftable
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Overwrite the held stock.
    pub fn set_quantity(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        self.quantity = quantity;
        Ok(())
    }

    /// Apply a relative stock change and return the new quantity.
    pub fn adjust(&mut self, delta: i64) -> DomainResult<i64> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        let new_stock = self
            .quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("stock overflow"))?;
        if new_stock < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }

        self.quantity = new_stock;
        Ok(new_stock)
    }
}
