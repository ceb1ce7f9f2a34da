//! Order side: state machine manager and money derivation

pub mod manager;
pub mod money;

pub use manager::{
    OrderDetailsPatch, OrderDraft, OrderItemInput, OrdersManager, TransitionOutcome,
};

use shared::order::{OrderStatus, PaymentStatus};

use crate::store::StoreError;

/// Failures of the order state machine, surfaced to callers with enough
/// detail to correct the input. Deduction business-rule outcomes are NOT
/// here - they come back as data on the transition outcome.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("unknown status: {0}")]
    InvalidStatus(String),

    #[error("order not found: {0}")]
    NotFound(String),

    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("illegal payment transition: {from} -> {to}")]
    IllegalPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("concurrent update conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type TransitionResult<T> = Result<T, TransitionError>;
