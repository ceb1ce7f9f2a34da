//! OrdersManager - order lifecycle command processing
//!
//! Every mutation of an order flows through here:
//!
//! ```text
//! checkout / transition / update_details / transition_payment
//!     ├─ 1. load current order
//!     ├─ 2. validate against the status machine
//!     ├─ 3. conditional version write (retry on conflict)
//!     ├─ 4. side effects (COMPLETED ⇒ synchronous stock deduction,
//!     │      failures appended to the alert log, never rolled back)
//!     └─ 5. notification fan-out with the post-transition snapshot
//! ```
//!
//! Within a single order, step 3 serializes concurrent transitions: two
//! writers racing from the same starting status cannot both commit.

use std::sync::Arc;

use shared::models::{BatchResult, DeductionRequest, DeductionLine};
use shared::order::{
    Order, OrderAlert, OrderEventKind, OrderItem, OrderStatus, PaymentStatus, PrepStatus,
    StatusHistoryEntry,
};
use shared::order::types::CustomerIdentity;
use shared::types::Actor;

use super::money;
use super::{TransitionError, TransitionResult};
use crate::inventory::DeductionEngine;
use crate::notify::Notifier;
use crate::store::{OrderStore, StoreError};

/// Bounded optimistic retries before surfacing a conflict to the caller
const MAX_WRITE_RETRIES: usize = 3;

// ============================================================================
// Inputs
// ============================================================================

/// One line of a checkout or detail-update request
#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub catalog_item_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub modifiers: Vec<shared::order::ModifierSelection>,
}

/// Checkout input, already validated at the HTTP boundary
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub restaurant_id: String,
    pub table_id: Option<String>,
    pub customer: CustomerIdentity,
    pub items: Vec<OrderItemInput>,
    pub service_charge_rate: f64,
    pub tip: f64,
    pub loyalty_discount: f64,
    pub special_instructions: Option<String>,
}

/// Bounded detail update: items and instructions only, blocked once the
/// order is terminal
#[derive(Debug, Clone, Default)]
pub struct OrderDetailsPatch {
    pub items: Option<Vec<OrderItemInput>>,
    pub special_instructions: Option<String>,
    pub tip: Option<f64>,
}

/// Result of a committed status transition
#[derive(Debug)]
pub struct TransitionOutcome {
    /// Post-transition snapshot, including any alerts the side effects added
    pub order: Order,
    pub previous_status: OrderStatus,
    /// Present when the transition triggered stock deduction
    pub deduction: Option<BatchResult>,
}

// ============================================================================
// Manager
// ============================================================================

/// Command processor over the order aggregate.
///
/// Collaborators are injected so tests can substitute fakes per case.
pub struct OrdersManager {
    orders: Arc<dyn OrderStore>,
    deduction: Arc<DeductionEngine>,
    notifier: Arc<Notifier>,
    default_prep_minutes: u32,
}

impl OrdersManager {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        deduction: Arc<DeductionEngine>,
        notifier: Arc<Notifier>,
        default_prep_minutes: u32,
    ) -> Self {
        Self {
            orders,
            deduction,
            notifier,
            default_prep_minutes,
        }
    }

    async fn load(&self, order_id: &str) -> TransitionResult<Order> {
        self.orders.get(order_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => TransitionError::NotFound(order_id.to_string()),
            other => TransitionError::Storage(other),
        })
    }

    fn build_items(inputs: &[OrderItemInput]) -> TransitionResult<Vec<OrderItem>> {
        if inputs.is_empty() {
            return Err(TransitionError::Validation(
                "order must contain at least one item".to_string(),
            ));
        }
        let mut items = Vec::with_capacity(inputs.len());
        for input in inputs {
            money::validate_line(&input.name, input.quantity, input.unit_price, &input.modifiers)?;
            let subtotal =
                money::line_subtotal(input.quantity, input.unit_price, &input.modifiers);
            items.push(OrderItem {
                catalog_item_id: input.catalog_item_id.clone(),
                name: input.name.clone(),
                quantity: input.quantity,
                unit_price: input.unit_price,
                modifiers: input.modifiers.clone(),
                line_subtotal: money::to_f64(subtotal),
                prep_status: Some(PrepStatus::Pending),
            });
        }
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Checkout
    // ------------------------------------------------------------------

    /// Create a PENDING order from a checkout draft and fan out
    /// `OrderCreated` (which is what reaches the partner webhook).
    pub async fn checkout(&self, draft: OrderDraft) -> TransitionResult<Order> {
        money::validate_charge_inputs(draft.service_charge_rate, draft.tip, draft.loyalty_discount)?;
        let items = Self::build_items(&draft.items)?;
        let charges = money::derive_charges(
            &items,
            draft.service_charge_rate,
            draft.tip,
            draft.loyalty_discount,
        )?;

        let order = Order::new(
            draft.restaurant_id,
            draft.table_id,
            draft.customer,
            items,
            charges,
            draft.service_charge_rate,
            draft.special_instructions,
        );
        self.orders.insert(order.clone()).await?;
        tracing::info!(order_id = %order.id, restaurant_id = %order.restaurant_id, total = order.charges.total, "Order created");

        self.notifier
            .dispatch(&order, OrderEventKind::OrderCreated, None, None, None)
            .await;
        Ok(order)
    }

    // ------------------------------------------------------------------
    // Status transitions
    // ------------------------------------------------------------------

    /// Apply a status transition with its side effects.
    ///
    /// Deduction failures at completion degrade the outcome (alert log +
    /// report) but never roll the committed status back.
    pub async fn transition(
        &self,
        order_id: &str,
        requested: OrderStatus,
        actor: &Actor,
        note: Option<String>,
    ) -> TransitionResult<TransitionOutcome> {
        let mut last_conflict = String::new();
        for _ in 0..MAX_WRITE_RETRIES {
            let current = self.load(order_id).await?;
            if !current.status.can_transition_to(requested) {
                return Err(TransitionError::IllegalTransition {
                    from: current.status,
                    to: requested,
                });
            }

            let now = chrono::Utc::now().timestamp_millis();
            let mut next = current.clone();
            next.status = requested;
            next.status_history.push(StatusHistoryEntry {
                status: requested,
                timestamp: now,
                note: note.clone(),
            });
            match requested {
                OrderStatus::Preparing if next.prep_estimate_minutes.is_none() => {
                    next.prep_estimate_minutes = Some(self.default_prep_minutes);
                }
                OrderStatus::Cancelled => {
                    next.cancel_reason = note.clone();
                }
                OrderStatus::Completed => {
                    next.completed_at = Some(now);
                }
                _ => {}
            }

            match self.orders.update(&next, current.version).await {
                Ok(committed) => {
                    return self
                        .finish_transition(committed, current.status, requested, actor, note)
                        .await;
                }
                Err(StoreError::Conflict(msg)) => {
                    tracing::debug!(order_id, conflict = %msg, "Transition write conflicted, retrying");
                    last_conflict = msg;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(TransitionError::Conflict(last_conflict))
    }

    async fn finish_transition(
        &self,
        committed: Order,
        previous: OrderStatus,
        requested: OrderStatus,
        actor: &Actor,
        note: Option<String>,
    ) -> TransitionResult<TransitionOutcome> {
        tracing::info!(
            order_id = %committed.id,
            from = %previous,
            to = %requested,
            operator = %actor.name,
            "Order transitioned"
        );

        let mut latest = committed.clone();
        let mut deduction = None;

        if requested == OrderStatus::Completed {
            let request = DeductionRequest {
                restaurant_id: committed.restaurant_id.clone(),
                lines: committed
                    .items
                    .iter()
                    .map(|i| DeductionLine {
                        catalog_item_id: i.catalog_item_id.clone(),
                        quantity_sold: i.quantity,
                    })
                    .collect(),
                order_id: committed.id.clone(),
            };
            match self.deduction.deduct(&request, actor).await {
                Ok(batch) => {
                    if batch.degraded() {
                        tracing::warn!(
                            order_id = %committed.id,
                            failed = batch.failed.len(),
                            skipped = batch.skipped.len(),
                            "Order completed with inventory discrepancies"
                        );
                        latest = self
                            .append_alerts(&committed.id, alerts_from_batch(&batch))
                            .await
                            .unwrap_or(latest);
                    }
                    deduction = Some(batch);
                }
                Err(e) => {
                    // Inventory store failure is NOT a transaction failure of
                    // the checkout; the order stays completed
                    tracing::error!(order_id = %committed.id, error = %e, "Stock deduction aborted");
                    latest = self
                        .append_alerts(
                            &committed.id,
                            vec![OrderAlert {
                                message: "stock deduction aborted".to_string(),
                                detail: Some(e.to_string()),
                                timestamp: chrono::Utc::now().timestamp_millis(),
                            }],
                        )
                        .await
                        .unwrap_or(latest);
                }
            }
        }

        let kind = if requested == OrderStatus::Cancelled {
            OrderEventKind::OrderCancelled
        } else {
            OrderEventKind::StatusChanged
        };
        self.notifier
            .dispatch(&latest, kind, Some(previous), None, note)
            .await;

        Ok(TransitionOutcome {
            order: latest,
            previous_status: previous,
            deduction,
        })
    }

    /// Best-effort append to the order's alert log; failures are logged,
    /// the transition result is unaffected
    async fn append_alerts(&self, order_id: &str, alerts: Vec<OrderAlert>) -> Option<Order> {
        for _ in 0..MAX_WRITE_RETRIES {
            let current = match self.orders.get(order_id).await {
                Ok(order) => order,
                Err(e) => {
                    tracing::error!(order_id, error = %e, "Failed to load order for alert append");
                    return None;
                }
            };
            let mut next = current.clone();
            next.alerts.extend(alerts.iter().cloned());
            match self.orders.update(&next, current.version).await {
                Ok(saved) => return Some(saved),
                Err(StoreError::Conflict(_)) => continue,
                Err(e) => {
                    tracing::error!(order_id, error = %e, "Failed to append alerts");
                    return None;
                }
            }
        }
        tracing::warn!(order_id, "Alert append abandoned after retries");
        None
    }

    // ------------------------------------------------------------------
    // Payment transitions
    // ------------------------------------------------------------------

    /// Update the parallel payment status field
    pub async fn transition_payment(
        &self,
        order_id: &str,
        requested: PaymentStatus,
        actor: &Actor,
    ) -> TransitionResult<Order> {
        let mut last_conflict = String::new();
        for _ in 0..MAX_WRITE_RETRIES {
            let current = self.load(order_id).await?;
            if !current.payment_status.can_transition_to(requested) {
                return Err(TransitionError::IllegalPaymentTransition {
                    from: current.payment_status,
                    to: requested,
                });
            }
            let mut next = current.clone();
            next.payment_status = requested;
            match self.orders.update(&next, current.version).await {
                Ok(committed) => {
                    tracing::info!(
                        order_id,
                        from = %current.payment_status,
                        to = %requested,
                        operator = %actor.name,
                        "Payment status updated"
                    );
                    self.notifier
                        .dispatch(
                            &committed,
                            OrderEventKind::PaymentStatusChanged,
                            None,
                            Some(current.payment_status),
                            None,
                        )
                        .await;
                    return Ok(committed);
                }
                Err(StoreError::Conflict(msg)) => last_conflict = msg,
                Err(e) => return Err(e.into()),
            }
        }
        Err(TransitionError::Conflict(last_conflict))
    }

    // ------------------------------------------------------------------
    // Detail updates
    // ------------------------------------------------------------------

    /// Patch items/instructions while the order is still mutable.
    ///
    /// Recomputes subtotal, service charge and total from the patched item
    /// list with the same derivation as checkout.
    pub async fn update_details(
        &self,
        order_id: &str,
        patch: OrderDetailsPatch,
        _actor: &Actor,
    ) -> TransitionResult<Order> {
        let mut last_conflict = String::new();
        for _ in 0..MAX_WRITE_RETRIES {
            let current = self.load(order_id).await?;
            if current.status.is_terminal() {
                return Err(TransitionError::IllegalState(format!(
                    "order {} is {} and can no longer be edited",
                    order_id, current.status
                )));
            }

            let mut next = current.clone();
            if let Some(inputs) = &patch.items {
                next.items = Self::build_items(inputs)?;
            }
            if let Some(instructions) = &patch.special_instructions {
                next.special_instructions = Some(instructions.clone());
            }
            let tip = patch.tip.unwrap_or(next.charges.tip);
            money::validate_charge_inputs(
                next.service_charge_rate,
                tip,
                next.charges.loyalty_discount,
            )?;
            next.charges = money::derive_charges(
                &next.items,
                next.service_charge_rate,
                tip,
                next.charges.loyalty_discount,
            )?;

            match self.orders.update(&next, current.version).await {
                Ok(committed) => {
                    tracing::info!(order_id, total = committed.charges.total, "Order details updated");
                    self.notifier
                        .dispatch(&committed, OrderEventKind::OrderUpdated, None, None, None)
                        .await;
                    return Ok(committed);
                }
                Err(StoreError::Conflict(msg)) => last_conflict = msg,
                Err(e) => return Err(e.into()),
            }
        }
        Err(TransitionError::Conflict(last_conflict))
    }

    /// Read one order
    pub async fn get(&self, order_id: &str) -> TransitionResult<Order> {
        self.load(order_id).await
    }
}

/// Render a degraded batch as alert-log entries for operational follow-up
fn alerts_from_batch(batch: &BatchResult) -> Vec<OrderAlert> {
    let now = chrono::Utc::now().timestamp_millis();
    let mut alerts = Vec::new();
    for failure in &batch.failed {
        let detail = failure
            .insufficient
            .iter()
            .map(|i| {
                format!(
                    "{}: required {} {}, available {} {}",
                    i.name, i.required, i.unit, i.available, i.unit
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        alerts.push(OrderAlert {
            message: format!("insufficient stock for {}", failure.catalog_item_id),
            detail: Some(detail),
            timestamp: now,
        });
    }
    for skip in &batch.skipped {
        let message = match skip.reason {
            shared::models::SkipReason::NoRecipe => {
                format!("no active recipe for {}", skip.catalog_item_id)
            }
            shared::models::SkipReason::EmptyRecipe => {
                format!("recipe for {} has no ingredients", skip.catalog_item_id)
            }
        };
        alerts.push(OrderAlert {
            message,
            detail: None,
            timestamp: now,
        });
    }
    alerts
}
