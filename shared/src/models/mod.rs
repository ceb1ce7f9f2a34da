//! Inventory domain models

pub mod deduction;
pub mod inventory;
pub mod movement;
pub mod recipe;

pub use deduction::{
    AvailabilityLine, AvailabilityReport, BatchResult, DeductionLine, DeductionRequest, FailedLine,
    IngredientDeduction, InsufficientIngredient, ProcessedLine, SkipReason, SkippedLine,
};
pub use inventory::{InventoryItem, UnitOfMeasure};
pub use movement::{MovementType, StockMovement};
pub use recipe::{IngredientRequirement, Recipe};
