//! Inventory API Module
//!
//! Availability pre-checks and read-only inventory/ledger views.

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/inventory", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/availability", post(handler::check_availability))
        .route("/{id}/movements", get(handler::list_movements))
}
