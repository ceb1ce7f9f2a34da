//! Shared types for the Ladle platform
//!
//! Domain types used across the operations backend: order aggregate and
//! status machines, inventory/recipe/movement models, order events, deduction
//! contracts and the actor identity handed in by the auth layer.

pub mod error;
pub mod models;
pub mod order;
pub mod types;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Order re-exports (for convenient access)
pub use order::{Order, OrderEvent, OrderEventKind, OrderStatus, PaymentStatus};

// Actor re-exports
pub use types::{Actor, ActorRole};
