//! Stock deduction engine
//!
//! Converts "N units of catalog item X sold" into ledger movements without
//! letting one bad line poison the batch:
//!
//! ```text
//! deduct(request)
//!     ├─ per line, independently:
//!     │    1. resolve active recipe        (none ⇒ skipped, nothing mutated)
//!     │    2. empty recipe                 (⇒ skipped)
//!     │    3. lock every ingredient (sorted ids), verify ALL sufficient
//!     │    4. any short ⇒ line fails listing EVERY short ingredient,
//!     │       zero movements written
//!     │    5. all sufficient ⇒ deduct each + one SOLD movement per ingredient
//!     └─ StoreError aborts remaining lines; committed lines stay intact
//! ```
//!
//! The per-item lock table is the critical section of §concurrency: two
//! orders completing at once that share an ingredient cannot both pass the
//! sufficiency check against a stale balance.

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use shared::models::{
    AvailabilityLine, AvailabilityReport, BatchResult, DeductionRequest, FailedLine,
    IngredientDeduction, InsufficientIngredient, MovementType, ProcessedLine, Recipe, SkipReason,
    SkippedLine, StockMovement, UnitOfMeasure,
};
use shared::types::Actor;
use tokio::sync::Mutex;

use super::resolver::RecipeResolver;
use crate::orders::money::{to_decimal, to_f64};
use crate::store::{InventoryStore, StoreError, StoreResult};

/// Quantity precision on the f64 boundary (milligram-level for weights)
const QUANTITY_DECIMALS: u32 = 3;

#[inline]
fn to_quantity(value: Decimal) -> f64 {
    value
        .round_dp(QUANTITY_DECIMALS)
        .to_f64()
        .unwrap_or_default()
}

/// One ingredient requirement of a line, recipe quantities already scaled
/// by the sold quantity
struct Requirement {
    inventory_item_id: String,
    required: Decimal,
    unit: UnitOfMeasure,
}

enum LineOutcome {
    Committed(ProcessedLine),
    Insufficient(FailedLine),
    Skipped(SkippedLine),
}

/// Recipe-driven stock deduction with partial-failure semantics
pub struct DeductionEngine {
    inventory: Arc<dyn InventoryStore>,
    resolver: RecipeResolver,
    /// Per-inventory-item critical sections
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DeductionEngine {
    pub fn new(inventory: Arc<dyn InventoryStore>, resolver: RecipeResolver) -> Self {
        Self {
            inventory,
            resolver,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, inventory_item_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(inventory_item_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Scale the recipe to the sold quantity, merging duplicate ingredients
    fn requirements_of(recipe: &Recipe, quantity_sold: i32) -> Vec<Requirement> {
        let qty = Decimal::from(quantity_sold);
        let mut requirements: Vec<Requirement> = Vec::with_capacity(recipe.ingredients.len());
        for ingredient in &recipe.ingredients {
            let required = to_decimal(ingredient.quantity_per_serving) * qty;
            if let Some(existing) = requirements
                .iter_mut()
                .find(|r| r.inventory_item_id == ingredient.inventory_item_id)
            {
                existing.required += required;
            } else {
                requirements.push(Requirement {
                    inventory_item_id: ingredient.inventory_item_id.clone(),
                    required,
                    unit: ingredient.unit,
                });
            }
        }
        requirements
    }

    /// Load every required item and check sufficiency. Returns the loaded
    /// items alongside EVERY insufficient ingredient found, not just the
    /// first. A missing or soft-deleted item reads as zero available.
    async fn verify(
        &self,
        requirements: &[Requirement],
    ) -> StoreResult<(
        Vec<(shared::models::InventoryItem, Decimal)>,
        Vec<InsufficientIngredient>,
    )> {
        let mut loaded = Vec::with_capacity(requirements.len());
        let mut insufficient = Vec::new();

        for requirement in requirements {
            match self.inventory.get(&requirement.inventory_item_id).await {
                Ok(item) if item.active => {
                    let available = to_decimal(item.current_stock);
                    if available < requirement.required {
                        insufficient.push(InsufficientIngredient {
                            inventory_item_id: item.id.clone(),
                            name: item.name.clone(),
                            required: to_quantity(requirement.required),
                            available: item.current_stock,
                            unit: item.unit,
                        });
                    }
                    loaded.push((item, requirement.required));
                }
                Ok(item) => {
                    insufficient.push(InsufficientIngredient {
                        inventory_item_id: item.id.clone(),
                        name: item.name.clone(),
                        required: to_quantity(requirement.required),
                        available: 0.0,
                        unit: item.unit,
                    });
                }
                Err(StoreError::NotFound(_)) => {
                    // Recipe references an item that no longer exists;
                    // reported as a shortage, never raised
                    insufficient.push(InsufficientIngredient {
                        inventory_item_id: requirement.inventory_item_id.clone(),
                        name: requirement.inventory_item_id.clone(),
                        required: to_quantity(requirement.required),
                        available: 0.0,
                        unit: requirement.unit,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok((loaded, insufficient))
    }

    async fn process_line(
        &self,
        restaurant_id: &str,
        catalog_item_id: &str,
        quantity_sold: i32,
        order_id: &str,
        actor: &Actor,
    ) -> StoreResult<LineOutcome> {
        let Some(recipe) = self.resolver.resolve(restaurant_id, catalog_item_id).await? else {
            tracing::debug!(catalog_item_id, "No active recipe, line skipped");
            return Ok(LineOutcome::Skipped(SkippedLine {
                catalog_item_id: catalog_item_id.to_string(),
                quantity_sold,
                reason: SkipReason::NoRecipe,
            }));
        };
        if recipe.ingredients.is_empty() {
            return Ok(LineOutcome::Skipped(SkippedLine {
                catalog_item_id: catalog_item_id.to_string(),
                quantity_sold,
                reason: SkipReason::EmptyRecipe,
            }));
        }

        let requirements = Self::requirements_of(&recipe, quantity_sold);

        // Lock every ingredient for the line's check-and-commit. Ids are
        // sorted so concurrent lines acquire in a single global order.
        let mut lock_ids: Vec<String> = requirements
            .iter()
            .map(|r| r.inventory_item_id.clone())
            .collect();
        lock_ids.sort();
        let mut guards = Vec::with_capacity(lock_ids.len());
        for id in &lock_ids {
            guards.push(self.lock_for(id).lock_owned().await);
        }

        // All ingredients must be verified sufficient before any is deducted
        let (loaded, insufficient) = self.verify(&requirements).await?;
        if !insufficient.is_empty() {
            tracing::warn!(
                catalog_item_id,
                order_id,
                short = insufficient.len(),
                "Insufficient stock, line rejected without deduction"
            );
            return Ok(LineOutcome::Insufficient(FailedLine {
                catalog_item_id: catalog_item_id.to_string(),
                quantity_sold,
                insufficient,
            }));
        }

        let mut deductions = Vec::with_capacity(loaded.len());
        for (item, required) in loaded {
            let previous = to_decimal(item.current_stock);
            let new_balance = previous - required;
            let updated = self
                .inventory
                .set_stock(&item.id, to_quantity(new_balance))
                .await?;

            let movement = StockMovement {
                id: uuid::Uuid::new_v4().to_string(),
                inventory_item_id: item.id.clone(),
                restaurant_id: restaurant_id.to_string(),
                movement_type: MovementType::Sold,
                delta: to_quantity(-required),
                previous_balance: to_quantity(previous),
                new_balance: updated.current_stock,
                unit_cost: item.average_cost,
                total_cost: to_f64(required * to_decimal(item.average_cost)),
                reason: Some(format!("sold on order {} by {}", order_id, actor.name)),
                reference_id: Some(order_id.to_string()),
                timestamp: chrono::Utc::now().timestamp_millis(),
            };
            self.inventory.append_movement(movement.clone()).await?;

            deductions.push(IngredientDeduction {
                inventory_item_id: item.id,
                name: item.name,
                quantity: to_quantity(required),
                unit: item.unit,
                new_balance: updated.current_stock,
                movement_id: movement.id,
            });
        }

        Ok(LineOutcome::Committed(ProcessedLine {
            catalog_item_id: catalog_item_id.to_string(),
            quantity_sold,
            ingredients: deductions,
        }))
    }

    /// Deduct stock for a batch of sold lines.
    ///
    /// Business-rule outcomes (no recipe, insufficient stock) come back as
    /// data in the [`BatchResult`]; only infrastructure failures raise, and
    /// they abort the remaining lines while leaving committed lines intact.
    pub async fn deduct(
        &self,
        request: &DeductionRequest,
        actor: &Actor,
    ) -> StoreResult<BatchResult> {
        let mut result = BatchResult::default();
        for line in &request.lines {
            let outcome = self
                .process_line(
                    &request.restaurant_id,
                    &line.catalog_item_id,
                    line.quantity_sold,
                    &request.order_id,
                    actor,
                )
                .await?;
            match outcome {
                LineOutcome::Committed(p) => result.processed.push(p),
                LineOutcome::Insufficient(f) => result.failed.push(f),
                LineOutcome::Skipped(s) => result.skipped.push(s),
            }
        }
        tracing::info!(
            order_id = %request.order_id,
            processed = result.processed.len(),
            failed = result.failed.len(),
            skipped = result.skipped.len(),
            "Deduction batch finished"
        );
        Ok(result)
    }

    /// Pure read-only availability check (pre-checkout cart validation).
    /// Mutates nothing and takes no locks.
    pub async fn check_availability(
        &self,
        restaurant_id: &str,
        lines: &[(String, i32)],
    ) -> StoreResult<AvailabilityReport> {
        let mut report = AvailabilityReport { lines: Vec::new() };
        for (catalog_item_id, quantity) in lines {
            let Some(recipe) = self.resolver.resolve(restaurant_id, catalog_item_id).await? else {
                report.lines.push(AvailabilityLine {
                    catalog_item_id: catalog_item_id.clone(),
                    quantity: *quantity,
                    available: true,
                    insufficient: vec![],
                    skipped: Some(SkipReason::NoRecipe),
                });
                continue;
            };
            if recipe.ingredients.is_empty() {
                report.lines.push(AvailabilityLine {
                    catalog_item_id: catalog_item_id.clone(),
                    quantity: *quantity,
                    available: true,
                    insufficient: vec![],
                    skipped: Some(SkipReason::EmptyRecipe),
                });
                continue;
            }
            let requirements = Self::requirements_of(&recipe, *quantity);
            let (_, insufficient) = self.verify(&requirements).await?;
            report.lines.push(AvailabilityLine {
                catalog_item_id: catalog_item_id.clone(),
                quantity: *quantity,
                available: insufficient.is_empty(),
                insufficient,
                skipped: None,
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryInventoryStore, InMemoryRecipeStore, RecipeStore};
    use shared::models::{DeductionLine, IngredientRequirement, InventoryItem};
    use shared::types::ActorRole;

    struct Fixture {
        inventory: Arc<InMemoryInventoryStore>,
        recipes: Arc<InMemoryRecipeStore>,
        engine: Arc<DeductionEngine>,
    }

    fn fixture() -> Fixture {
        let inventory = Arc::new(InMemoryInventoryStore::new());
        let recipes = Arc::new(InMemoryRecipeStore::new());
        let engine = Arc::new(DeductionEngine::new(
            inventory.clone(),
            RecipeResolver::new(recipes.clone()),
        ));
        Fixture {
            inventory,
            recipes,
            engine,
        }
    }

    fn actor() -> Actor {
        Actor::new("u-1", "Ana", ActorRole::Staff, "rest-1")
    }

    async fn seed_item(fixture: &Fixture, name: &str, stock: f64, cost: f64) -> String {
        let item = InventoryItem::new("rest-1", name, UnitOfMeasure::Grams, stock, 100.0, cost);
        let id = item.id.clone();
        fixture.inventory.upsert(item).await.unwrap();
        id
    }

    async fn seed_recipe(fixture: &Fixture, catalog_item_id: &str, ingredients: Vec<(String, f64)>) {
        let ingredients = ingredients
            .into_iter()
            .map(|(id, qty)| IngredientRequirement {
                inventory_item_id: id,
                quantity_per_serving: qty,
                unit: UnitOfMeasure::Grams,
            })
            .collect();
        fixture
            .recipes
            .upsert(Recipe::new("rest-1", catalog_item_id, ingredients))
            .await
            .unwrap();
    }

    fn request(lines: Vec<(&str, i32)>) -> DeductionRequest {
        DeductionRequest {
            restaurant_id: "rest-1".to_string(),
            lines: lines
                .into_iter()
                .map(|(id, qty)| DeductionLine {
                    catalog_item_id: id.to_string(),
                    quantity_sold: qty,
                })
                .collect(),
            order_id: "order-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_no_recipe_skips_without_mutation() {
        let fx = fixture();
        let result = fx.engine.deduct(&request(vec![("pizza", 2)]), &actor()).await.unwrap();
        assert!(!result.success());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].reason, SkipReason::NoRecipe);
    }

    #[tokio::test]
    async fn test_empty_recipe_skips() {
        let fx = fixture();
        seed_recipe(&fx, "water", vec![]).await;
        let result = fx.engine.deduct(&request(vec![("water", 1)]), &actor()).await.unwrap();
        assert_eq!(result.skipped[0].reason, SkipReason::EmptyRecipe);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rejects_line_unchanged() {
        // Pizza needs 200g cheese per serving; 2 sold against 350g stock
        let fx = fixture();
        let cheese = seed_item(&fx, "Cheese", 350.0, 0.01).await;
        seed_recipe(&fx, "pizza", vec![(cheese.clone(), 200.0)]).await;

        let result = fx.engine.deduct(&request(vec![("pizza", 2)]), &actor()).await.unwrap();
        assert!(!result.success());
        assert_eq!(result.failed.len(), 1);
        let failure = &result.failed[0];
        assert_eq!(failure.insufficient.len(), 1);
        assert_eq!(failure.insufficient[0].required, 400.0);
        assert_eq!(failure.insufficient[0].available, 350.0);

        // Stock untouched, no ledger entry
        assert_eq!(fx.inventory.get(&cheese).await.unwrap().current_stock, 350.0);
        assert!(fx.inventory.movements_for_item(&cheese).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sufficient_stock_commits_with_ledger_entry() {
        let fx = fixture();
        let cheese = seed_item(&fx, "Cheese", 500.0, 0.01).await;
        seed_recipe(&fx, "pizza", vec![(cheese.clone(), 200.0)]).await;

        let result = fx.engine.deduct(&request(vec![("pizza", 2)]), &actor()).await.unwrap();
        assert!(result.success());
        assert_eq!(result.processed.len(), 1);
        let breakdown = &result.processed[0].ingredients;
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].quantity, 400.0);
        assert_eq!(breakdown[0].new_balance, 100.0);

        assert_eq!(fx.inventory.get(&cheese).await.unwrap().current_stock, 100.0);
        let movements = fx.inventory.movements_for_item(&cheese).await.unwrap();
        assert_eq!(movements.len(), 1);
        let movement = &movements[0];
        assert_eq!(movement.movement_type, MovementType::Sold);
        assert_eq!(movement.previous_balance, 500.0);
        assert_eq!(movement.new_balance, 100.0);
        assert_eq!(movement.delta, -400.0);
        assert_eq!(movement.total_cost, 4.0);
        assert_eq!(movement.reference_id.as_deref(), Some("order-1"));
        assert!(movement.balances_consistent());
    }

    #[tokio::test]
    async fn test_line_atomicity_multiple_ingredients() {
        // Dough is sufficient, cheese is not: ZERO movements for the line
        let fx = fixture();
        let cheese = seed_item(&fx, "Cheese", 100.0, 0.01).await;
        let dough = seed_item(&fx, "Dough", 1000.0, 0.002).await;
        seed_recipe(&fx, "pizza", vec![(cheese.clone(), 200.0), (dough.clone(), 150.0)]).await;

        let result = fx.engine.deduct(&request(vec![("pizza", 1)]), &actor()).await.unwrap();
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].insufficient.len(), 1);
        assert_eq!(result.failed[0].insufficient[0].name, "Cheese");

        assert_eq!(fx.inventory.get(&dough).await.unwrap().current_stock, 1000.0);
        assert!(fx.inventory.movements_for_item(&dough).await.unwrap().is_empty());
        assert!(fx.inventory.movements_for_item(&cheese).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_insufficient_ingredients_are_listed() {
        let fx = fixture();
        let cheese = seed_item(&fx, "Cheese", 10.0, 0.01).await;
        let dough = seed_item(&fx, "Dough", 5.0, 0.002).await;
        seed_recipe(&fx, "pizza", vec![(cheese, 200.0), (dough, 150.0)]).await;

        let result = fx.engine.deduct(&request(vec![("pizza", 1)]), &actor()).await.unwrap();
        assert_eq!(result.failed[0].insufficient.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_batch_mixes_outcomes() {
        let fx = fixture();
        let cheese = seed_item(&fx, "Cheese", 500.0, 0.01).await;
        let beef = seed_item(&fx, "Beef", 50.0, 0.05).await;
        seed_recipe(&fx, "pizza", vec![(cheese.clone(), 200.0)]).await;
        seed_recipe(&fx, "burger", vec![(beef, 180.0)]).await;

        let result = fx
            .engine
            .deduct(&request(vec![("pizza", 1), ("burger", 1), ("soda", 2)]), &actor())
            .await
            .unwrap();
        // Batch is partially successful: pizza committed, burger short, soda untracked
        assert!(result.success());
        assert!(result.degraded());
        assert_eq!(result.processed.len(), 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(fx.inventory.get(&cheese).await.unwrap().current_stock, 300.0);
    }

    #[tokio::test]
    async fn test_missing_inventory_item_reads_as_shortage() {
        let fx = fixture();
        seed_recipe(&fx, "pizza", vec![("ghost-item".to_string(), 10.0)]).await;

        let result = fx.engine.deduct(&request(vec![("pizza", 1)]), &actor()).await.unwrap();
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].insufficient[0].available, 0.0);
    }

    #[tokio::test]
    async fn test_inactive_item_cannot_be_consumed() {
        let fx = fixture();
        let mut item = InventoryItem::new("rest-1", "Cheese", UnitOfMeasure::Grams, 500.0, 100.0, 0.01);
        item.active = false;
        let id = item.id.clone();
        fx.inventory.upsert(item).await.unwrap();
        seed_recipe(&fx, "pizza", vec![(id.clone(), 100.0)]).await;

        let result = fx.engine.deduct(&request(vec![("pizza", 1)]), &actor()).await.unwrap();
        assert_eq!(result.failed.len(), 1);
        assert_eq!(fx.inventory.get(&id).await.unwrap().current_stock, 500.0);
    }

    #[tokio::test]
    async fn test_duplicate_ingredient_requirements_merge() {
        let fx = fixture();
        let cheese = seed_item(&fx, "Cheese", 500.0, 0.01).await;
        // Recipe lists cheese twice: 100g + 150g per serving
        seed_recipe(&fx, "double-cheese", vec![(cheese.clone(), 100.0), (cheese.clone(), 150.0)]).await;

        let result = fx
            .engine
            .deduct(&request(vec![("double-cheese", 2)]), &actor())
            .await
            .unwrap();
        assert!(result.success());
        // (100 + 150) * 2 = 500, one merged movement
        assert_eq!(fx.inventory.get(&cheese).await.unwrap().current_stock, 0.0);
        assert_eq!(fx.inventory.movements_for_item(&cheese).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_deductions_never_oversell() {
        // Two orders both need 50 units against stock 80: exactly one wins
        let fx = fixture();
        let syrup = seed_item(&fx, "Syrup", 80.0, 0.02).await;
        seed_recipe(&fx, "lemonade", vec![(syrup.clone(), 50.0)]).await;

        let a = {
            let engine = fx.engine.clone();
            tokio::spawn(async move {
                engine
                    .deduct(
                        &DeductionRequest {
                            restaurant_id: "rest-1".to_string(),
                            lines: vec![DeductionLine {
                                catalog_item_id: "lemonade".to_string(),
                                quantity_sold: 1,
                            }],
                            order_id: "order-a".to_string(),
                        },
                        &Actor::new("u-1", "Ana", ActorRole::Staff, "rest-1"),
                    )
                    .await
                    .unwrap()
            })
        };
        let b = {
            let engine = fx.engine.clone();
            tokio::spawn(async move {
                engine
                    .deduct(
                        &DeductionRequest {
                            restaurant_id: "rest-1".to_string(),
                            lines: vec![DeductionLine {
                                catalog_item_id: "lemonade".to_string(),
                                quantity_sold: 1,
                            }],
                            order_id: "order-b".to_string(),
                        },
                        &Actor::new("u-2", "Ben", ActorRole::Staff, "rest-1"),
                    )
                    .await
                    .unwrap()
            })
        };

        let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
        let successes = [ra.success(), rb.success()].iter().filter(|s| **s).count();
        assert_eq!(successes, 1, "exactly one order may win the stock");

        let final_stock = fx.inventory.get(&syrup).await.unwrap().current_stock;
        assert_eq!(final_stock, 30.0);
        assert!(final_stock >= 0.0);
        assert_eq!(fx.inventory.movements_for_item(&syrup).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_check_availability_is_pure() {
        let fx = fixture();
        let cheese = seed_item(&fx, "Cheese", 350.0, 0.01).await;
        seed_recipe(&fx, "pizza", vec![(cheese.clone(), 200.0)]).await;

        let report = fx
            .engine
            .check_availability("rest-1", &[("pizza".to_string(), 2), ("soda".to_string(), 1)])
            .await
            .unwrap();
        assert!(!report.all_available());
        assert!(!report.lines[0].available);
        assert_eq!(report.lines[0].insufficient[0].required, 400.0);
        // Untracked item counts as available
        assert!(report.lines[1].available);
        assert_eq!(report.lines[1].skipped, Some(SkipReason::NoRecipe));

        // Nothing moved
        assert_eq!(fx.inventory.get(&cheese).await.unwrap().current_stock, 350.0);
        assert!(fx.inventory.movements_for_item(&cheese).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ledger_matches_stock_cache_after_batches() {
        let fx = fixture();
        let cheese = seed_item(&fx, "Cheese", 1000.0, 0.01).await;
        seed_recipe(&fx, "pizza", vec![(cheese.clone(), 200.0)]).await;

        for order in ["o-1", "o-2", "o-3"] {
            fx.engine
                .deduct(
                    &DeductionRequest {
                        restaurant_id: "rest-1".to_string(),
                        lines: vec![DeductionLine {
                            catalog_item_id: "pizza".to_string(),
                            quantity_sold: 1,
                        }],
                        order_id: order.to_string(),
                    },
                    &actor(),
                )
                .await
                .unwrap();
        }

        let stock = fx.inventory.get(&cheese).await.unwrap().current_stock;
        let delta_sum: f64 = fx
            .inventory
            .movements_for_item(&cheese)
            .await
            .unwrap()
            .iter()
            .map(|m| m.delta)
            .sum();
        assert_eq!(stock, 400.0);
        assert_eq!(1000.0 + delta_sum, stock);
    }
}
