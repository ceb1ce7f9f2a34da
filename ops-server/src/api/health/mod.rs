//! Health check endpoint

use axum::{Json, Router, routing::get};
use serde::Serialize;
use shared::error::ApiResponse;

use crate::core::{ServerState, ok};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<ApiResponse<Health>> {
    ok(Health { status: "ok" })
}
