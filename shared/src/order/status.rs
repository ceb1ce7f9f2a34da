//! Order and payment status machines
//!
//! The fulfillment chain is linear:
//!
//! ```text
//! PENDING → ACCEPTED → PREPARING → READY → DELIVERED → COMPLETED
//!     └────────┴───────────┴─────────┘
//!             CANCELLED / REJECTED (from any non-terminal state)
//! ```
//!
//! Forward movement may skip intermediate states (counter checkout goes
//! straight from PENDING to COMPLETED); backward movement never validates.
//! DELIVERED admits exactly one outgoing transition, to COMPLETED.

use serde::{Deserialize, Serialize};

/// Order fulfillment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Preparing,
    Ready,
    Delivered,
    Completed,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Position along the main fulfillment chain; CANCELLED/REJECTED are off-chain
    fn chain_position(self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Accepted => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Completed => Some(5),
            OrderStatus::Cancelled | OrderStatus::Rejected => None,
        }
    }

    /// Terminal statuses admit no outgoing transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    /// Whether the status machine permits `self → next`
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() || self == next {
            return false;
        }
        // DELIVERED is immutable except for the final completion step
        if self == OrderStatus::Delivered {
            return next == OrderStatus::Completed;
        }
        match next {
            OrderStatus::Cancelled | OrderStatus::Rejected => true,
            _ => match (self.chain_position(), next.chain_position()) {
                (Some(from), Some(to)) => to > from,
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "ACCEPTED" => Ok(OrderStatus::Accepted),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "READY" => Ok(OrderStatus::Ready),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            "REJECTED" => Ok(OrderStatus::Rejected),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Payment status, updated independently of the fulfillment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
    PartiallyRefunded,
}

impl PaymentStatus {
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
                | (PaymentStatus::Paid, PaymentStatus::PartiallyRefunded)
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::PartiallyRefunded => "PARTIALLY_REFUNDED",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            "PARTIALLY_REFUNDED" => Ok(PaymentStatus::PartiallyRefunded),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Raised when a status string falls outside the closed enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);
