//! Order store - conditional version writes for per-order serialization

use async_trait::async_trait;
use dashmap::DashMap;
use shared::order::Order;

use super::{StoreError, StoreResult};

/// Durable storage seam for orders.
///
/// `update` is a conditional write: it commits only when the stored version
/// still equals `expected_version`, then bumps the version. Callers retry
/// from a fresh read on [`StoreError::Conflict`]. Last-writer-wins is not
/// offered.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> StoreResult<()>;

    async fn get(&self, order_id: &str) -> StoreResult<Order>;

    /// Conditional write; returns the committed order (version bumped)
    async fn update(&self, order: &Order, expected_version: u64) -> StoreResult<Order>;

    async fn list_for_restaurant(&self, restaurant_id: &str) -> StoreResult<Vec<Order>>;
}

/// In-memory order store backed by a sharded concurrent map.
///
/// The shard lock held by `get_mut` makes the version check and the write a
/// single atomic step.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<String, Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> StoreResult<()> {
        if self.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        self.orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> StoreResult<Order> {
        self.orders
            .get(order_id)
            .map(|o| o.clone())
            .ok_or_else(|| StoreError::NotFound(format!("order {}", order_id)))
    }

    async fn update(&self, order: &Order, expected_version: u64) -> StoreResult<Order> {
        let mut entry = self
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| StoreError::NotFound(format!("order {}", order.id)))?;
        if entry.version != expected_version {
            return Err(StoreError::Conflict(format!(
                "order {}: expected version {}, found {}",
                order.id, expected_version, entry.version
            )));
        }
        let mut committed = order.clone();
        committed.version = expected_version + 1;
        committed.updated_at = chrono::Utc::now().timestamp_millis();
        *entry = committed.clone();
        Ok(committed)
    }

    async fn list_for_restaurant(&self, restaurant_id: &str) -> StoreResult<Vec<Order>> {
        Ok(self
            .orders
            .iter()
            .filter(|o| o.restaurant_id == restaurant_id)
            .map(|o| o.clone())
            .collect())
    }
}
