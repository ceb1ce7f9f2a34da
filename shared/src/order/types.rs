//! Order aggregate and its embedded types

use super::status::{OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};

// ============================================================================
// Customer Identity
// ============================================================================

/// Who placed the order: a registered account or an ephemeral guest device.
///
/// Exactly one variant is ever set; the tagged representation makes the
/// mutual exclusion structural instead of a runtime check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerIdentity {
    Registered { user_id: String },
    Guest { device_token: String },
}

impl CustomerIdentity {
    /// Stable identifier for audit trails and webhook payloads
    pub fn key(&self) -> &str {
        match self {
            CustomerIdentity::Registered { user_id } => user_id,
            CustomerIdentity::Guest { device_token } => device_token,
        }
    }
}

// ============================================================================
// Order Items
// ============================================================================

/// Per-item preparation status (kitchen display advisory, does not gate
/// order-level transitions)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrepStatus {
    Pending,
    Preparing,
    Ready,
    Served,
}

/// A modifier selected on an order line (extra cheese, no onion, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModifierSelection {
    pub name: String,
    pub quantity: i32,
    /// Price per modifier unit
    pub unit_price: f64,
}

/// One order line. Owned by the order, no identity outside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Catalog item this line sells
    pub catalog_item_id: String,
    /// Name snapshot at checkout time
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<ModifierSelection>,
    /// Computed: (unit_price + modifier prices) * quantity
    pub line_subtotal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_status: Option<PrepStatus>,
}

// ============================================================================
// Monetary Breakdown
// ============================================================================

/// Monetary breakdown of an order.
///
/// Invariant: `total = subtotal + service_charge + tip - loyalty_discount`.
/// Tax is carried for the wire shape but currently always zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Charges {
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub service_charge: f64,
    pub loyalty_discount: f64,
    pub total: f64,
}

// ============================================================================
// Append-only Logs
// ============================================================================

/// One entry of the order's append-only status history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    /// Unix milliseconds
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One entry of the order's append-only alert log.
///
/// Alerts record degraded outcomes that did not fail the order itself,
/// such as stock deduction problems at completion time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderAlert {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: i64,
}

// ============================================================================
// Order Aggregate
// ============================================================================

/// An order, one per checkout.
///
/// Mutated only through the state machine (status/payment) or the bounded
/// update-details path; never physically deleted, only terminal-stated.
/// `version` backs the optimistic conditional write at the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    pub customer: CustomerIdentity,
    pub items: Vec<OrderItem>,
    pub charges: Charges,
    /// Service charge rate applied at checkout (fraction of subtotal),
    /// kept so detail updates can re-derive the charge
    pub service_charge_rate: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub status_history: Vec<StatusHistoryEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<OrderAlert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Minutes, defaulted when entering PREPARING without an estimate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_estimate_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Optimistic concurrency guard, incremented by every committed write
    #[serde(default)]
    pub version: u64,
}

impl Order {
    /// Create a fresh PENDING order with a seeded status history
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        restaurant_id: impl Into<String>,
        table_id: Option<String>,
        customer: CustomerIdentity,
        items: Vec<OrderItem>,
        charges: Charges,
        service_charge_rate: f64,
        special_instructions: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.into(),
            table_id,
            customer,
            items,
            charges,
            service_charge_rate,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            status_history: vec![StatusHistoryEntry {
                status: OrderStatus::Pending,
                timestamp: now,
                note: None,
            }],
            alerts: Vec::new(),
            special_instructions,
            cancel_reason: None,
            prep_estimate_minutes: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Lines in the shape the deduction engine consumes
    pub fn sold_lines(&self) -> Vec<(String, i32)> {
        self.items
            .iter()
            .map(|i| (i.catalog_item_id.clone(), i.quantity))
            .collect()
    }
}
