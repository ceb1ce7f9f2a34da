//! Durable event publication sink

use std::sync::Arc;

use shared::order::{Order, OrderEvent, OrderEventKind, OrderStatus, PaymentStatus};

use crate::store::{EventLog, StoreResult};

/// Publishes typed order events to the append-only event log for other
/// services to consume. Events are keyed by order id; the log's global
/// sequence gives consumers per-order ordering.
pub struct EventPublisher {
    log: Arc<dyn EventLog>,
}

impl EventPublisher {
    pub fn new(log: Arc<dyn EventLog>) -> Self {
        Self { log }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn publish(
        &self,
        order: &Order,
        kind: OrderEventKind,
        previous_status: Option<OrderStatus>,
        previous_payment_status: Option<PaymentStatus>,
        reason: Option<String>,
    ) -> StoreResult<OrderEvent> {
        let mut event = OrderEvent::draft(order, kind).with_reason(reason);
        if let Some(previous) = previous_status {
            event = event.with_status_change(previous, order.status);
        }
        if let Some(previous) = previous_payment_status {
            event = event.with_payment_change(previous, order.payment_status);
        }
        let sequenced = self.log.append(event).await?;
        tracing::debug!(
            order_id = %sequenced.order_id,
            kind = %sequenced.kind,
            sequence = sequenced.sequence,
            "Order event published"
        );
        Ok(sequenced)
    }
}
