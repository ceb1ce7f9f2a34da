//! Inventory item model

use serde::{Deserialize, Serialize};

/// Unit of measure for stocked ingredients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitOfMeasure {
    Grams,
    Kilograms,
    Milliliters,
    Liters,
    Pieces,
}

impl std::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnitOfMeasure::Grams => "g",
            UnitOfMeasure::Kilograms => "kg",
            UnitOfMeasure::Milliliters => "ml",
            UnitOfMeasure::Liters => "l",
            UnitOfMeasure::Pieces => "pcs",
        };
        write!(f, "{}", s)
    }
}

/// One stocked ingredient, scoped to a restaurant.
///
/// `current_stock` is a cache over the movement ledger: after any committed
/// batch it must equal the sum of all movement deltas for the item.
/// Mutated only by the deduction engine and the out-of-scope adjustment
/// flows; soft-deleted via `active`, never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub unit: UnitOfMeasure,
    /// Invariant: never negative
    pub current_stock: f64,
    pub reorder_threshold: f64,
    /// Average unit cost, maintained by the purchasing flow
    pub average_cost: f64,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl InventoryItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        restaurant_id: impl Into<String>,
        name: impl Into<String>,
        unit: UnitOfMeasure,
        current_stock: f64,
        reorder_threshold: f64,
        average_cost: f64,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.into(),
            name: name.into(),
            unit,
            current_stock,
            reorder_threshold,
            average_cost,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Below the reorder threshold (dashboard warning condition)
    pub fn needs_reorder(&self) -> bool {
        self.current_stock <= self.reorder_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_reorder() {
        let mut item = InventoryItem::new("rest-1", "Cheese", UnitOfMeasure::Grams, 500.0, 200.0, 0.01);
        assert!(!item.needs_reorder());
        item.current_stock = 150.0;
        assert!(item.needs_reorder());
    }

    #[test]
    fn test_unit_display() {
        assert_eq!(UnitOfMeasure::Grams.to_string(), "g");
        assert_eq!(UnitOfMeasure::Pieces.to_string(), "pcs");
    }
}
