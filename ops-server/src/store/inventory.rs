//! Inventory store - stock cache plus append-only movement ledger

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use shared::models::{InventoryItem, StockMovement};

use super::{StoreError, StoreResult};

/// Storage seam for inventory items and the movement ledger.
///
/// `set_stock` is a raw balance write; the deduction engine is responsible
/// for holding the per-item critical section around its check-and-commit.
/// Movement appends are independent per entry and safely concurrent.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn upsert(&self, item: InventoryItem) -> StoreResult<()>;

    async fn get(&self, item_id: &str) -> StoreResult<InventoryItem>;

    async fn set_stock(&self, item_id: &str, new_stock: f64) -> StoreResult<InventoryItem>;

    async fn append_movement(&self, movement: StockMovement) -> StoreResult<()>;

    async fn movements_for_item(&self, item_id: &str) -> StoreResult<Vec<StockMovement>>;

    async fn list_for_restaurant(&self, restaurant_id: &str) -> StoreResult<Vec<InventoryItem>>;
}

/// In-memory inventory store
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    items: DashMap<String, InventoryItem>,
    /// Append-only; never mutated in place
    ledger: RwLock<Vec<StockMovement>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn upsert(&self, item: InventoryItem) -> StoreResult<()> {
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    async fn get(&self, item_id: &str) -> StoreResult<InventoryItem> {
        self.items
            .get(item_id)
            .map(|i| i.clone())
            .ok_or_else(|| StoreError::NotFound(format!("inventory item {}", item_id)))
    }

    async fn set_stock(&self, item_id: &str, new_stock: f64) -> StoreResult<InventoryItem> {
        let mut entry = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| StoreError::NotFound(format!("inventory item {}", item_id)))?;
        entry.current_stock = new_stock;
        entry.updated_at = chrono::Utc::now().timestamp_millis();
        Ok(entry.clone())
    }

    async fn append_movement(&self, movement: StockMovement) -> StoreResult<()> {
        self.ledger.write().push(movement);
        Ok(())
    }

    async fn movements_for_item(&self, item_id: &str) -> StoreResult<Vec<StockMovement>> {
        Ok(self
            .ledger
            .read()
            .iter()
            .filter(|m| m.inventory_item_id == item_id)
            .cloned()
            .collect())
    }

    async fn list_for_restaurant(&self, restaurant_id: &str) -> StoreResult<Vec<InventoryItem>> {
        Ok(self
            .items
            .iter()
            .filter(|i| i.restaurant_id == restaurant_id)
            .map(|i| i.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{MovementType, UnitOfMeasure};

    fn cheese() -> InventoryItem {
        InventoryItem::new("rest-1", "Cheese", UnitOfMeasure::Grams, 500.0, 100.0, 0.01)
    }

    #[tokio::test]
    async fn test_set_stock_updates_cache() {
        let store = InMemoryInventoryStore::new();
        let item = cheese();
        let id = item.id.clone();
        store.upsert(item).await.unwrap();

        let updated = store.set_stock(&id, 100.0).await.unwrap();
        assert_eq!(updated.current_stock, 100.0);
        assert_eq!(store.get(&id).await.unwrap().current_stock, 100.0);
    }

    #[tokio::test]
    async fn test_ledger_filters_by_item() {
        let store = InMemoryInventoryStore::new();
        let item = cheese();
        let id = item.id.clone();
        store.upsert(item).await.unwrap();

        store
            .append_movement(StockMovement {
                id: "m-1".to_string(),
                inventory_item_id: id.clone(),
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
            })
            .await
            .unwrap();
        store
            .append_movement(StockMovement {
                id: "m-2".to_string(),
                inventory_item_id: "other".to_string(),
                restaurant_id: "rest-1".to_string(),
                movement_type: MovementType::Received,
                delta: 50.0,
                previous_balance: 0.0,
                new_balance: 50.0,
                unit_cost: 0.0,
                total_cost: 0.0,
                reason: None,
                reference_id: None,
                timestamp: 0,
            })
            .await
            .unwrap();

        let movements = store.movements_for_item(&id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].id, "m-1");
    }

    #[tokio::test]
    async fn test_missing_item_is_not_found() {
        let store = InMemoryInventoryStore::new();
        assert!(matches!(
            store.get("ghost").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.set_stock("ghost", 1.0).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
