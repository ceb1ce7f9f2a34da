//! Order events - immutable facts published after committed transitions

use super::status::{OrderStatus, PaymentStatus};
use super::types::Order;
use serde::{Deserialize, Serialize};

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventKind {
    OrderCreated,
    OrderUpdated,
    StatusChanged,
    PaymentStatusChanged,
    OrderCancelled,
}

impl std::fmt::Display for OrderEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderEventKind::OrderCreated => "ORDER_CREATED",
            OrderEventKind::OrderUpdated => "ORDER_UPDATED",
            OrderEventKind::StatusChanged => "STATUS_CHANGED",
            OrderEventKind::PaymentStatusChanged => "PAYMENT_STATUS_CHANGED",
            OrderEventKind::OrderCancelled => "ORDER_CANCELLED",
        };
        write!(f, "{}", s)
    }
}

/// Minimal order projection carried on every event.
///
/// Downstream consumers that need the full aggregate fetch it themselves;
/// the event stream stays small.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderProjection {
    pub order_id: String,
    pub restaurant_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: f64,
    pub item_count: usize,
}

impl From<&Order> for OrderProjection {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            restaurant_id: order.restaurant_id.clone(),
            status: order.status,
            payment_status: order.payment_status,
            total: order.charges.total,
            item_count: order.items.len(),
        }
    }
}

/// Order event - durable, append-only audit record.
///
/// `sequence` is the global ordering mechanism; events are keyed by
/// `order_id` so consumers can order per order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderEvent {
    pub event_id: String,
    /// Global sequence number, assigned by the event log at append time
    pub sequence: u64,
    pub order_id: String,
    pub restaurant_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    pub kind: OrderEventKind,
    pub projection: OrderProjection,
    /// Previous/new values being compared, present for status changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_payment_status: Option<PaymentStatus>,
    /// Free-text reason (cancellations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OrderEvent {
    /// Build an unsequenced event; the event log assigns `sequence` on append
    pub fn draft(order: &Order, kind: OrderEventKind) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence: 0,
            order_id: order.id.clone(),
            restaurant_id: order.restaurant_id.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            kind,
            projection: OrderProjection::from(order),
            previous_status: None,
            new_status: None,
            previous_payment_status: None,
            new_payment_status: None,
            reason: None,
        }
    }

    pub fn with_status_change(mut self, previous: OrderStatus, new: OrderStatus) -> Self {
        self.previous_status = Some(previous);
        self.new_status = Some(new);
        self
    }

    pub fn with_payment_change(mut self, previous: PaymentStatus, new: PaymentStatus) -> Self {
        self.previous_payment_status = Some(previous);
        self.new_payment_status = Some(new);
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }
}
