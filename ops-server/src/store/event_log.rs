//! Append-only event log with a global sequence

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::order::OrderEvent;
use std::sync::atomic::{AtomicU64, Ordering};

use super::StoreResult;

/// Durable event publication seam.
///
/// `append` assigns the global sequence number - the authoritative ordering
/// mechanism - and returns the sequenced event. Entries are never mutated
/// or deleted.
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn append(&self, event: OrderEvent) -> StoreResult<OrderEvent>;

    async fn for_order(&self, order_id: &str) -> StoreResult<Vec<OrderEvent>>;

    async fn all(&self) -> StoreResult<Vec<OrderEvent>>;
}

/// In-memory append-only event log
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<OrderEvent>>,
    sequence: AtomicU64,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(&self, mut event: OrderEvent) -> StoreResult<OrderEvent> {
        // Sequence allocation and append under the same write lock so
        // log order matches sequence order
        let mut events = self.events.write();
        event.sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        events.push(event.clone());
        Ok(event)
    }

    async fn for_order(&self, order_id: &str) -> StoreResult<Vec<OrderEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn all(&self) -> StoreResult<Vec<OrderEvent>> {
        Ok(self.events.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{Charges, CustomerIdentity, Order, OrderEventKind};

    fn sample_order() -> Order {
        Order::new(
            "rest-1",
            None,
            CustomerIdentity::Guest {
                device_token: "dev".to_string(),
            },
            vec![],
            Charges::default(),
            0.0,
            None,
        )
    }

    #[tokio::test]
    async fn test_sequences_are_monotonic() {
        let log = InMemoryEventLog::new();
        let order = sample_order();

        let first = log
            .append(OrderEvent::draft(&order, OrderEventKind::OrderCreated))
            .await
            .unwrap();
        let second = log
            .append(OrderEvent::draft(&order, OrderEventKind::StatusChanged))
            .await
            .unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
    }

    #[tokio::test]
    async fn test_for_order_filters() {
        let log = InMemoryEventLog::new();
        let a = sample_order();
        let b = sample_order();

        log.append(OrderEvent::draft(&a, OrderEventKind::OrderCreated))
            .await
            .unwrap();
        log.append(OrderEvent::draft(&b, OrderEventKind::OrderCreated))
            .await
            .unwrap();
        log.append(OrderEvent::draft(&a, OrderEventKind::StatusChanged))
            .await
            .unwrap();

        let for_a = log.for_order(&a.id).await.unwrap();
        assert_eq!(for_a.len(), 2);
        assert!(for_a.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }
}
