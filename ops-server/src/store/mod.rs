//! Store seams and in-memory engines
//!
//! Persistence technology is an external collaborator; the traits here are
//! the integration boundary and the in-memory engines carry the full
//! concurrency contracts:
//!
//! - [`OrderStore`]: conditional version write, so no two concurrent
//!   transitions on the same order both succeed from the same start state
//! - [`InventoryStore`]: stock cache + append-only movement ledger
//! - [`RecipeStore`]: versioned recipes per (restaurant, catalog item)
//! - [`EventLog`]: append-only event stream with a global sequence

pub mod event_log;
pub mod inventory;
pub mod order;
pub mod recipe;

pub use event_log::{EventLog, InMemoryEventLog};
pub use inventory::{InMemoryInventoryStore, InventoryStore};
pub use order::{InMemoryOrderStore, OrderStore};
pub use recipe::{InMemoryRecipeStore, RecipeStore};

/// Infrastructure-level store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("version conflict: {0}")]
    Conflict(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
