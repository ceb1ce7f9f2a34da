//! Order domain: aggregate, status machines, events

pub mod event;
pub mod status;
pub mod types;

pub use event::{OrderEvent, OrderEventKind, OrderProjection};
pub use status::{OrderStatus, PaymentStatus, UnknownStatus};
pub use types::{
    Charges, CustomerIdentity, ModifierSelection, Order, OrderAlert, OrderItem, PrepStatus,
    StatusHistoryEntry,
};
