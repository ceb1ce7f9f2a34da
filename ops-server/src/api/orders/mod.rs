//! Orders API Module
//!
//! REST surface over the order lifecycle: checkout, status/payment
//! transitions, bounded detail updates and event-log reads.

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id).patch(handler::update_details))
        .route("/{id}/status", post(handler::update_status))
        .route("/{id}/payment-status", post(handler::update_payment_status))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/events", get(handler::list_events))
}
