//! HTTP API surface
//!
//! Thin I/O wrappers around the core: routing, payload validation and
//! tenant-scope checks live here; all business rules live in the manager
//! and the deduction engine.

pub mod extract;
pub mod health;
pub mod inventory;
pub mod orders;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::ServerState;

pub use extract::CurrentActor;

/// Build the full application router
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(inventory::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
