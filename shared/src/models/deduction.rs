//! Stock deduction contracts
//!
//! The order-completion path calls the deduction engine with a
//! [`DeductionRequest`] and gets a [`BatchResult`] back, non-fatally:
//! business-rule failures (no recipe, insufficient stock) are data, not
//! errors, and the caller proceeds regardless of the success flag.

use super::inventory::UnitOfMeasure;
use serde::{Deserialize, Serialize};

/// Batch deduction request, one line per sold catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionRequest {
    pub restaurant_id: String,
    pub lines: Vec<DeductionLine>,
    /// Originating order, recorded on every movement
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionLine {
    pub catalog_item_id: String,
    pub quantity_sold: i32,
}

/// Why a line was skipped without touching stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    NoRecipe,
    EmptyRecipe,
}

/// An ingredient that failed the sufficiency check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsufficientIngredient {
    pub inventory_item_id: String,
    pub name: String,
    pub required: f64,
    pub available: f64,
    pub unit: UnitOfMeasure,
}

/// Per-ingredient breakdown of a committed line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientDeduction {
    pub inventory_item_id: String,
    pub name: String,
    /// Quantity deducted
    pub quantity: f64,
    pub unit: UnitOfMeasure,
    /// Balance after the deduction
    pub new_balance: f64,
    pub movement_id: String,
}

/// A line whose every ingredient was verified and deducted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedLine {
    pub catalog_item_id: String,
    pub quantity_sold: i32,
    pub ingredients: Vec<IngredientDeduction>,
}

/// A line rejected before any deduction. Lists every insufficient
/// ingredient found, not just the first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedLine {
    pub catalog_item_id: String,
    pub quantity_sold: i32,
    pub insufficient: Vec<InsufficientIngredient>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedLine {
    pub catalog_item_id: String,
    pub quantity_sold: i32,
    pub reason: SkipReason,
}

/// Structured partial-result report of one deduction batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub processed: Vec<ProcessedLine>,
    pub failed: Vec<FailedLine>,
    pub skipped: Vec<SkippedLine>,
}

impl BatchResult {
    /// The batch counts as (partially) successful when at least one line
    /// committed; callers must still inspect `failed`/`skipped`.
    pub fn success(&self) -> bool {
        !self.processed.is_empty()
    }

    pub fn degraded(&self) -> bool {
        !self.failed.is_empty() || !self.skipped.is_empty()
    }
}

/// Read-only availability report (pre-checkout cart validation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub lines: Vec<AvailabilityLine>,
}

impl AvailabilityReport {
    /// True when no line reported an insufficiency
    pub fn all_available(&self) -> bool {
        self.lines.iter().all(|l| l.available)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityLine {
    pub catalog_item_id: String,
    pub quantity: i32,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insufficient: Vec<InsufficientIngredient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}
