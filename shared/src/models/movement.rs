//! Stock movement ledger entry

use serde::{Deserialize, Serialize};

/// Movement type of a ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Received,
    Used,
    Wasted,
    Adjusted,
    Sold,
    Returned,
    Transferred,
}

/// Immutable, append-only ledger entry; one per committed deduction or
/// adjustment. The ledger is the source of truth for stock history -
/// `InventoryItem::current_stock` must always equal the sum of deltas.
///
/// Invariant: `new_balance = previous_balance + delta`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMovement {
    pub id: String,
    pub inventory_item_id: String,
    pub restaurant_id: String,
    pub movement_type: MovementType,
    /// Signed quantity delta (negative for consumption)
    pub delta: f64,
    pub previous_balance: f64,
    pub new_balance: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Originating business object (order id, purchase-order id, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    pub timestamp: i64,
}

/// Tolerance for quantity comparisons on the f64 wire shape
const QUANTITY_EPSILON: f64 = 1e-6;

impl StockMovement {
    /// Check the balance invariant of this entry
    pub fn balances_consistent(&self) -> bool {
        (self.previous_balance + self.delta - self.new_balance).abs() < QUANTITY_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_invariant() {
        let movement = StockMovement {
            id: "m-1".to_string(),
            inventory_item_id: "inv-1".to_string(),
            restaurant_id: "rest-1".to_string(),
            movement_type: MovementType::Sold,
            delta: -400.0,
            previous_balance: 500.0,
            new_balance: 100.0,
            unit_cost: 0.01,
            total_cost: 4.0,
            reason: None,
            reference_id: Some("order-1".to_string()),
            timestamp: 0,
        };
        assert!(movement.balances_consistent());

        let broken = StockMovement {
            new_balance: 150.0,
            ..movement
        };
        assert!(!broken.balances_consistent());
    }
}
