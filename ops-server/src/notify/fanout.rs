//! Notification fan-out
//!
//! One committed order transition fans out to three independent sinks:
//!
//! ```text
//! OrdersManager (committed transition)
//!        │
//!        └── Notifier
//!               ├── RealtimeHub      (restaurant + order channels) [best-effort]
//!               ├── EventPublisher   (durable typed event)         [best-effort]
//!               └── WebhookSink      (brand-new orders only)       [best-effort]
//! ```
//!
//! Sinks run concurrently, each inside its own failure boundary with a
//! bounded timeout. A sink failure is logged and swallowed; it never affects
//! the other sinks or the already-committed order state.

use std::sync::Arc;
use std::time::Duration;

use shared::order::{Order, OrderEventKind, OrderStatus, PaymentStatus};
use tokio::time::timeout;

use super::publisher::EventPublisher;
use super::realtime::RealtimeHub;
use super::webhook::WebhookSink;

/// Per-sink outcome of one dispatch, mainly for logging and tests.
/// `webhook` is None when the sink did not apply (not configured, or not a
/// brand-new order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutReport {
    pub realtime_ok: bool,
    pub event_ok: bool,
    pub webhook_ok: Option<bool>,
}

/// Fan-out coordinator over the three sinks
pub struct Notifier {
    realtime: Arc<RealtimeHub>,
    publisher: Arc<EventPublisher>,
    webhook: Option<Arc<dyn WebhookSink>>,
    /// Bounded wait per sink; a slow webhook must not delay the caller's
    /// acknowledgment past this
    sink_timeout: Duration,
}

impl Notifier {
    pub fn new(
        realtime: Arc<RealtimeHub>,
        publisher: Arc<EventPublisher>,
        webhook: Option<Arc<dyn WebhookSink>>,
        sink_timeout: Duration,
    ) -> Self {
        Self {
            realtime,
            publisher,
            webhook,
            sink_timeout,
        }
    }

    /// Dispatch one committed transition to all sinks.
    ///
    /// Never fails: every sink error is logged and swallowed here.
    pub async fn dispatch(
        &self,
        order: &Order,
        kind: OrderEventKind,
        previous_status: Option<OrderStatus>,
        previous_payment_status: Option<PaymentStatus>,
        reason: Option<String>,
    ) -> FanoutReport {
        let realtime_fut = async {
            // In-process broadcast; missing subscribers are not a failure
            self.realtime
                .publish_order_update(order, kind, previous_status);
            true
        };

        let event_fut = async {
            match timeout(
                self.sink_timeout,
                self.publisher.publish(
                    order,
                    kind,
                    previous_status,
                    previous_payment_status,
                    reason,
                ),
            )
            .await
            {
                Ok(Ok(_)) => true,
                Ok(Err(e)) => {
                    tracing::error!(order_id = %order.id, error = %e, "Event publication sink failed");
                    false
                }
                Err(_) => {
                    tracing::error!(order_id = %order.id, "Event publication sink timed out");
                    false
                }
            }
        };

        let webhook_fut = async {
            // Partner delivery fires only for brand-new orders, and only
            // when the integration is configured
            if kind != OrderEventKind::OrderCreated {
                return None;
            }
            let sink = self.webhook.as_ref()?;
            match timeout(self.sink_timeout, sink.deliver(order)).await {
                Ok(Ok(())) => Some(true),
                Ok(Err(e)) => {
                    tracing::error!(order_id = %order.id, error = %e, "Webhook delivery failed");
                    Some(false)
                }
                Err(_) => {
                    tracing::error!(order_id = %order.id, "Webhook delivery timed out");
                    Some(false)
                }
            }
        };

        let (realtime_ok, event_ok, webhook_ok) =
            tokio::join!(realtime_fut, event_fut, webhook_fut);

        let report = FanoutReport {
            realtime_ok,
            event_ok,
            webhook_ok,
        };
        tracing::debug!(order_id = %order.id, kind = %kind, ?report, "Fan-out dispatched");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::realtime::{order_channel, restaurant_channel};
    use crate::notify::webhook::WebhookError;
    use crate::store::{EventLog, InMemoryEventLog};
    use async_trait::async_trait;
    use shared::order::{Charges, CustomerIdentity};

    struct FailingWebhook;

    #[async_trait]
    impl WebhookSink for FailingWebhook {
        async fn deliver(&self, _order: &Order) -> Result<(), WebhookError> {
            Err(WebhookError::Status(502))
        }
    }

    struct StallingWebhook;

    #[async_trait]
    impl WebhookSink for StallingWebhook {
        async fn deliver(&self, _order: &Order) -> Result<(), WebhookError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

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

    fn notifier(
        webhook: Option<Arc<dyn WebhookSink>>,
    ) -> (Notifier, Arc<RealtimeHub>, Arc<InMemoryEventLog>) {
        let hub = Arc::new(RealtimeHub::new());
        let log = Arc::new(InMemoryEventLog::new());
        let notifier = Notifier::new(
            hub.clone(),
            Arc::new(EventPublisher::new(log.clone())),
            webhook,
            Duration::from_millis(200),
        );
        (notifier, hub, log)
    }

    #[tokio::test]
    async fn test_webhook_failure_does_not_affect_other_sinks() {
        let (notifier, hub, log) = notifier(Some(Arc::new(FailingWebhook)));
        let order = sample_order();
        let mut rx = hub.subscribe(&restaurant_channel("rest-1"));

        let report = notifier
            .dispatch(&order, OrderEventKind::OrderCreated, None, None, None)
            .await;

        assert_eq!(report.webhook_ok, Some(false));
        assert!(report.realtime_ok);
        assert!(report.event_ok);
        assert!(rx.try_recv().is_ok());
        assert_eq!(log.for_order(&order.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_slow_webhook_is_bounded_by_timeout() {
        let (notifier, _hub, log) = notifier(Some(Arc::new(StallingWebhook)));
        let order = sample_order();

        let started = std::time::Instant::now();
        let report = notifier
            .dispatch(&order, OrderEventKind::OrderCreated, None, None, None)
            .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(report.webhook_ok, Some(false));
        assert_eq!(log.for_order(&order.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_webhook_skipped_for_non_created_events() {
        let (notifier, _hub, _log) = notifier(Some(Arc::new(FailingWebhook)));
        let order = sample_order();

        let report = notifier
            .dispatch(
                &order,
                OrderEventKind::StatusChanged,
                Some(OrderStatus::Pending),
                None,
                None,
            )
            .await;
        assert_eq!(report.webhook_ok, None);
    }

    #[tokio::test]
    async fn test_webhook_skipped_when_unconfigured() {
        let (notifier, _hub, _log) = notifier(None);
        let order = sample_order();

        let report = notifier
            .dispatch(&order, OrderEventKind::OrderCreated, None, None, None)
            .await;
        assert_eq!(report.webhook_ok, None);
    }

    #[tokio::test]
    async fn test_order_channel_receives_too() {
        let (notifier, hub, _log) = notifier(None);
        let order = sample_order();
        let mut rx = hub.subscribe(&order_channel(&order.id));

        notifier
            .dispatch(&order, OrderEventKind::OrderCreated, None, None, None)
            .await;
        assert_eq!(rx.try_recv().unwrap().order_id, order.id);
    }
}
