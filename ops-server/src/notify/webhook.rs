//! External delivery-platform webhook
//!
//! Transforms a brand-new order into the partner schema (monetary amounts in
//! minor currency units) and posts it outbound. Delivery is best-effort: the
//! call carries a bounded timeout, is never retried here, and failures are
//! caught by the fan-out layer, never raised to the transition caller.

use async_trait::async_trait;
use serde::Serialize;
use shared::order::{CustomerIdentity, Order};
use std::time::Duration;

use crate::orders::money::to_minor_units;

/// Webhook delivery failures (logged by the caller, never propagated)
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("partner endpoint returned status {0}")]
    Status(u16),
}

/// Outbound delivery seam; the HTTP implementation is swapped for fakes in
/// tests
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn deliver(&self, order: &Order) -> Result<(), WebhookError>;
}

// ============================================================================
// Partner schema
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PartnerOrder {
    pub external_id: String,
    pub restaurant_id: String,
    pub customer: PartnerCustomer,
    pub items: Vec<PartnerItem>,
    pub charges: PartnerCharges,
    pub placed_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartnerCustomer {
    Registered { user_id: String },
    Guest { device_token: String },
}

#[derive(Debug, Serialize)]
pub struct PartnerItem {
    pub name: String,
    pub quantity: i32,
    /// Minor currency units (cents)
    pub unit_price: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<PartnerModifier>,
}

#[derive(Debug, Serialize)]
pub struct PartnerModifier {
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
}

/// All amounts in minor currency units
#[derive(Debug, Serialize)]
pub struct PartnerCharges {
    pub subtotal: i64,
    pub service_charge: i64,
    pub tip: i64,
    pub loyalty_discount: i64,
    pub total: i64,
}

impl PartnerOrder {
    pub fn from_order(order: &Order) -> Self {
        Self {
            external_id: order.id.clone(),
            restaurant_id: order.restaurant_id.clone(),
            customer: match &order.customer {
                CustomerIdentity::Registered { user_id } => PartnerCustomer::Registered {
                    user_id: user_id.clone(),
                },
                CustomerIdentity::Guest { device_token } => PartnerCustomer::Guest {
                    device_token: device_token.clone(),
                },
            },
            items: order
                .items
                .iter()
                .map(|item| PartnerItem {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: to_minor_units(item.unit_price),
                    modifiers: item
                        .modifiers
                        .iter()
                        .map(|m| PartnerModifier {
                            name: m.name.clone(),
                            quantity: m.quantity,
                            unit_price: to_minor_units(m.unit_price),
                        })
                        .collect(),
                })
                .collect(),
            charges: PartnerCharges {
                subtotal: to_minor_units(order.charges.subtotal),
                service_charge: to_minor_units(order.charges.service_charge),
                tip: to_minor_units(order.charges.tip),
                loyalty_discount: to_minor_units(order.charges.loyalty_discount),
                total: to_minor_units(order.charges.total),
            },
            placed_at: order.created_at,
        }
    }
}

// ============================================================================
// HTTP delivery
// ============================================================================

/// reqwest-backed delivery to the configured partner endpoint
pub struct HttpWebhook {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpWebhook {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl WebhookSink for HttpWebhook {
    async fn deliver(&self, order: &Order) -> Result<(), WebhookError> {
        let payload = PartnerOrder::from_order(order);
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WebhookError::Status(response.status().as_u16()));
        }
        tracing::info!(order_id = %order.id, "Webhook delivered to partner");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{Charges, ModifierSelection, OrderItem};

    fn sample_order() -> Order {
        let items = vec![OrderItem {
            catalog_item_id: "item-1".to_string(),
            name: "Margherita".to_string(),
            quantity: 2,
            unit_price: 9.5,
            modifiers: vec![ModifierSelection {
                name: "Extra cheese".to_string(),
                quantity: 1,
                unit_price: 1.5,
            }],
            line_subtotal: 22.0,
            prep_status: None,
        }];
        let mut order = Order::new(
            "rest-1",
            None,
            CustomerIdentity::Registered {
                user_id: "u-9".to_string(),
            },
            items,
            Charges {
                subtotal: 22.0,
                tax: 0.0,
                tip: 2.0,
                service_charge: 2.2,
                loyalty_discount: 0.0,
                total: 26.2,
            },
            0.1,
            None,
        );
        order.table_id = Some("t-1".to_string());
        order
    }

    #[test]
    fn test_partner_schema_uses_minor_units() {
        let order = sample_order();
        let partner = PartnerOrder::from_order(&order);

        assert_eq!(partner.external_id, order.id);
        assert_eq!(partner.items[0].unit_price, 950);
        assert_eq!(partner.items[0].modifiers[0].unit_price, 150);
        assert_eq!(partner.charges.subtotal, 2200);
        assert_eq!(partner.charges.service_charge, 220);
        assert_eq!(partner.charges.total, 2620);
    }

    #[test]
    fn test_partner_customer_mapping() {
        let order = sample_order();
        let partner = PartnerOrder::from_order(&order);
        match partner.customer {
            PartnerCustomer::Registered { ref user_id } => assert_eq!(user_id, "u-9"),
            _ => panic!("expected registered customer"),
        }
    }
}
