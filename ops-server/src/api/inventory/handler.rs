//! Inventory handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::error::ApiResponse;
use shared::models::{AvailabilityReport, InventoryItem, StockMovement};
use validator::Validate;

use super::super::extract::CurrentActor;
use crate::core::{AppError, ServerState, ok};

#[derive(Debug, Deserialize, Serialize)]
pub struct AvailabilityLinePayload {
    pub catalog_item_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AvailabilityRequest {
    #[validate(length(min = 1))]
    pub restaurant_id: String,
    #[validate(length(min = 1))]
    pub lines: Vec<AvailabilityLinePayload>,
}

/// Pure pre-checkout cart validation; mutates nothing
pub async fn check_availability(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<ApiResponse<AvailabilityReport>>, AppError> {
    req.validate()?;
    if !actor.scoped_to(&req.restaurant_id) {
        return Err(AppError::Forbidden(
            "actor is not scoped to this restaurant".to_string(),
        ));
    }
    let lines: Vec<(String, i32)> = req
        .lines
        .into_iter()
        .map(|l| (l.catalog_item_id, l.quantity))
        .collect();
    let report = state
        .engine
        .check_availability(&req.restaurant_id, &lines)
        .await
        .map_err(AppError::from)?;
    Ok(ok(report))
}

/// Stocked items of the actor's restaurant
pub async fn list(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ApiResponse<Vec<InventoryItem>>>, AppError> {
    let items = state
        .inventory
        .list_for_restaurant(&actor.restaurant_id)
        .await
        .map_err(AppError::from)?;
    Ok(ok(items))
}

/// Movement ledger of one item (audit view)
pub async fn list_movements(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<StockMovement>>>, AppError> {
    let item = state.inventory.get(&id).await.map_err(AppError::from)?;
    if !actor.scoped_to(&item.restaurant_id) {
        return Err(AppError::Forbidden(format!(
            "inventory item {} belongs to another restaurant",
            id
        )));
    }
    let movements = state
        .inventory
        .movements_for_item(&id)
        .await
        .map_err(AppError::from)?;
    Ok(ok(movements))
}
