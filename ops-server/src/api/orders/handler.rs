//! Order handlers - thin I/O wrappers over the OrdersManager

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::error::ApiResponse;
use shared::models::BatchResult;
use shared::order::{
    CustomerIdentity, ModifierSelection, Order, OrderEvent, OrderStatus, PaymentStatus,
};
use validator::Validate;

use super::super::extract::CurrentActor;
use crate::core::{AppError, ServerState, ok};
use crate::orders::{OrderDetailsPatch, OrderDraft, OrderItemInput, TransitionError};

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct OrderItemPayload {
    pub catalog_item_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    #[serde(default)]
    pub modifiers: Vec<ModifierSelection>,
}

impl From<OrderItemPayload> for OrderItemInput {
    fn from(payload: OrderItemPayload) -> Self {
        Self {
            catalog_item_id: payload.catalog_item_id,
            name: payload.name,
            quantity: payload.quantity,
            unit_price: payload.unit_price,
            modifiers: payload.modifiers,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1))]
    pub restaurant_id: String,
    pub table_id: Option<String>,
    pub customer: CustomerIdentity,
    #[validate(length(min = 1))]
    pub items: Vec<OrderItemPayload>,
    #[serde(default)]
    pub service_charge_rate: f64,
    #[serde(default)]
    pub tip: f64,
    #[serde(default)]
    pub loyalty_discount: f64,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDetailsRequest {
    pub items: Option<Vec<OrderItemPayload>>,
    pub special_instructions: Option<String>,
    pub tip: Option<f64>,
}

/// Transition response: the committed order plus the deduction report when
/// the transition triggered one. A completed order with deduction issues
/// still reports success here; `deduction.failed`/`deduction.skipped` carry
/// the operational follow-up.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub order: Order,
    pub previous_status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduction: Option<BatchResult>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn load_scoped(
    state: &ServerState,
    actor: &shared::types::Actor,
    order_id: &str,
) -> Result<Order, AppError> {
    let order = state.manager.get(order_id).await.map_err(AppError::from)?;
    if !actor.scoped_to(&order.restaurant_id) {
        return Err(AppError::Forbidden(format!(
            "order {} belongs to another restaurant",
            order_id
        )));
    }
    Ok(order)
}

pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    req.validate()?;
    if !actor.scoped_to(&req.restaurant_id) {
        return Err(AppError::Forbidden(
            "actor is not scoped to this restaurant".to_string(),
        ));
    }

    let draft = OrderDraft {
        restaurant_id: req.restaurant_id,
        table_id: req.table_id,
        customer: req.customer,
        items: req.items.into_iter().map(Into::into).collect(),
        service_charge_rate: req.service_charge_rate,
        tip: req.tip,
        loyalty_discount: req.loyalty_discount,
        special_instructions: req.special_instructions,
    };
    let order = state.manager.checkout(draft).await?;
    Ok(ok(order))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let order = load_scoped(&state, &actor, &id).await?;
    Ok(ok(order))
}

pub async fn update_status(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<TransitionResponse>>, AppError> {
    load_scoped(&state, &actor, &id).await?;
    let requested: OrderStatus = req
        .status
        .parse()
        .map_err(|e: shared::order::UnknownStatus| TransitionError::InvalidStatus(e.0))?;

    let outcome = state
        .manager
        .transition(&id, requested, &actor, req.note)
        .await?;
    Ok(ok(TransitionResponse {
        order: outcome.order,
        previous_status: outcome.previous_status,
        deduction: outcome.deduction,
    }))
}

pub async fn update_payment_status(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    load_scoped(&state, &actor, &id).await?;
    let requested: PaymentStatus = req
        .payment_status
        .parse()
        .map_err(|e: shared::order::UnknownStatus| TransitionError::InvalidStatus(e.0))?;

    let order = state.manager.transition_payment(&id, requested, &actor).await?;
    Ok(ok(order))
}

pub async fn cancel(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<CancelOrderRequest>,
) -> Result<Json<ApiResponse<TransitionResponse>>, AppError> {
    load_scoped(&state, &actor, &id).await?;
    let outcome = state
        .manager
        .transition(&id, OrderStatus::Cancelled, &actor, req.reason)
        .await?;
    Ok(ok(TransitionResponse {
        order: outcome.order,
        previous_status: outcome.previous_status,
        deduction: outcome.deduction,
    }))
}

pub async fn update_details(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<UpdateDetailsRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    load_scoped(&state, &actor, &id).await?;
    let patch = OrderDetailsPatch {
        items: req.items.map(|items| items.into_iter().map(Into::into).collect()),
        special_instructions: req.special_instructions,
        tip: req.tip,
    };
    let order = state.manager.update_details(&id, patch, &actor).await?;
    Ok(ok(order))
}

pub async fn list_events(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<OrderEvent>>>, AppError> {
    load_scoped(&state, &actor, &id).await?;
    let events = state.events.for_order(&id).await.map_err(AppError::from)?;
    Ok(ok(events))
}
