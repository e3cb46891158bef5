//! Blueprint-usage creation with batch inventory consumption.
//!
//! The availability check is aggregate-first: demand is summed per inventory
//! item across the *whole batch* before anything is written, so a batch that
//! is collectively short is rejected in full even when every single usage
//! would fit on its own. Only after the usage rows commit does deduction
//! start, usage by usage in input order; from that point failures are
//! non-fatal and surface as warnings.

use std::collections::{BTreeMap, HashMap};

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BlueprintUsage, CreateUsagesCmd, EngineError, MovementType, ResultEngine, Shortage,
    blueprint_items, blueprints, inventory_items, inventory_movements,
    util::normalize_optional_text,
};

use super::{Engine, MAX_BATCH_USAGES, with_tx};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryDeduction {
    pub inventory_item_id: Uuid,
    pub item_name: String,
    pub blueprint_usage_id: Uuid,
    pub quantity_deducted: i64,
    pub new_quantity: i64,
    pub is_low_stock: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LowStockAlert {
    pub inventory_item_id: Uuid,
    pub item_name: String,
    pub current_quantity: i64,
    pub minimum_quantity: i64,
}

/// Batch financials: summed actual costs vs. summed sale prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchSummary {
    pub total_actual_cost_cents: i64,
    pub total_sale_price_cents: i64,
    pub projected_profit_cents: i64,
}

#[derive(Clone, Debug)]
pub struct UsageBatchOutcome {
    pub usages: Vec<BlueprintUsage>,
    pub deductions: Vec<InventoryDeduction>,
    pub low_stock_alerts: Vec<LowStockAlert>,
    pub summary: BatchSummary,
    /// Non-fatal deduction failures; the usages were created regardless.
    pub warnings: Vec<String>,
}

/// A spec that passed field validation.
struct ValidatedUsage {
    blueprint_id: Uuid,
    materials_cents: i64,
    labor_cents: i64,
    overhead_cents: i64,
    sale_price_cents: i64,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    notes: Option<String>,
}

impl Engine {
    /// Create blueprint usages (single or batch) and deduct the inventory
    /// they consume.
    ///
    /// Failure before the usage rows are created leaves no state behind.
    /// Deduction failures after that point are logged, reported in
    /// `warnings`, and do not unwind the created usages; see
    /// [`recompute_inventory_quantities`](Engine::recompute_inventory_quantities)
    /// for the repair path.
    pub async fn create_blueprint_usages(
        &self,
        cmd: CreateUsagesCmd,
    ) -> ResultEngine<UsageBatchOutcome> {
        if cmd.usages.is_empty() {
            return Err(EngineError::InvalidArgument(
                "at least one blueprint usage is required".to_string(),
            ));
        }
        if cmd.usages.len() > MAX_BATCH_USAGES {
            return Err(EngineError::InvalidArgument(format!(
                "batch of {} usages exceeds the limit of {MAX_BATCH_USAGES}",
                cmd.usages.len()
            )));
        }

        let (usages, requirements, summary) = with_tx!(self, |db_tx| {
            // (1) Every referenced blueprint must exist and belong to the
            // caller; report all missing ids at once.
            let mut referenced: Vec<Uuid> = cmd
                .usages
                .iter()
                .filter_map(|spec| spec.blueprint_id)
                .collect();
            referenced.sort_unstable();
            referenced.dedup();

            let blueprint_models: Vec<blueprints::Model> = blueprints::Entity::find()
                .filter(
                    blueprints::Column::Id
                        .is_in(referenced.iter().map(Uuid::to_string).collect::<Vec<_>>()),
                )
                .filter(blueprints::Column::UserId.eq(cmd.user_id.clone()))
                .all(&db_tx)
                .await?;
            let blueprints_by_id: HashMap<String, blueprints::Model> = blueprint_models
                .into_iter()
                .map(|model| (model.id.clone(), model))
                .collect();

            let missing: Vec<String> = referenced
                .iter()
                .filter(|id| !blueprints_by_id.contains_key(&id.to_string()))
                .map(Uuid::to_string)
                .collect();
            if !missing.is_empty() {
                return Err(EngineError::NotFound(format!(
                    "blueprint(s) {}",
                    missing.join(", ")
                )));
            }

            // (2) Required fields, named by batch index.
            let mut validated: Vec<ValidatedUsage> = Vec::with_capacity(cmd.usages.len());
            for (index, spec) in cmd.usages.iter().enumerate() {
                let blueprint_id = spec.blueprint_id.ok_or_else(|| {
                    EngineError::InvalidArgument(format!(
                        "blueprint_id is required (usage index {index})"
                    ))
                })?;
                let sale_price_cents = spec.actual_sale_price_cents.ok_or_else(|| {
                    EngineError::InvalidArgument(format!(
                        "actual_sale_price is required (usage index {index})"
                    ))
                })?;
                validated.push(ValidatedUsage {
                    blueprint_id,
                    materials_cents: spec.actual_materials_cost_cents.unwrap_or(0),
                    labor_cents: spec.actual_labor_cost_cents.unwrap_or(0),
                    overhead_cents: spec.actual_overhead_cost_cents.unwrap_or(0),
                    sale_price_cents,
                    completed_at: spec.completed_at,
                    notes: normalize_optional_text(spec.notes.as_deref()),
                });
            }

            // (3) The target invoice, when given, must be the caller's.
            let invoice_model = match cmd.invoice_id {
                Some(invoice_id) => Some(
                    self.require_invoice(&db_tx, invoice_id, &cmd.user_id)
                        .await?,
                ),
                None => None,
            };

            // Inventory requirements per blueprint.
            let item_rows: Vec<blueprint_items::Model> = blueprint_items::Entity::find()
                .filter(
                    blueprint_items::Column::BlueprintId
                        .is_in(referenced.iter().map(Uuid::to_string).collect::<Vec<_>>()),
                )
                .all(&db_tx)
                .await?;
            let mut items_per_blueprint: HashMap<String, Vec<(Uuid, i64)>> = HashMap::new();
            for row in item_rows {
                let item_id = crate::util::parse_uuid(&row.inventory_item_id, "inventory item")?;
                items_per_blueprint
                    .entry(row.blueprint_id.clone())
                    .or_default()
                    .push((item_id, row.quantity_required));
            }

            if cmd.deduct_inventory {
                // Aggregate demand across the whole batch, checked once
                // before anything is written.
                let mut demand: BTreeMap<Uuid, i64> = BTreeMap::new();
                for usage in &validated {
                    for (item_id, quantity) in items_per_blueprint
                        .get(&usage.blueprint_id.to_string())
                        .map(Vec::as_slice)
                        .unwrap_or_default()
                    {
                        *demand.entry(*item_id).or_insert(0) += quantity;
                    }
                }

                let stock: Vec<inventory_items::Model> = inventory_items::Entity::find()
                    .filter(
                        inventory_items::Column::Id
                            .is_in(demand.keys().map(Uuid::to_string).collect::<Vec<_>>()),
                    )
                    .filter(inventory_items::Column::UserId.eq(cmd.user_id.clone()))
                    .all(&db_tx)
                    .await?;
                let stock_by_id: HashMap<String, inventory_items::Model> = stock
                    .into_iter()
                    .map(|model| (model.id.clone(), model))
                    .collect();

                let mut shortages: Vec<Shortage> = Vec::new();
                for (item_id, required_quantity) in &demand {
                    let (current_quantity, item_name) = match stock_by_id.get(&item_id.to_string())
                    {
                        Some(model) => (model.current_quantity, model.name.clone()),
                        None => (0, "unknown item".to_string()),
                    };
                    if current_quantity < *required_quantity {
                        shortages.push(Shortage {
                            inventory_item_id: *item_id,
                            item_name,
                            current_quantity,
                            required_quantity: *required_quantity,
                            shortage: required_quantity - current_quantity,
                        });
                    }
                }
                if !shortages.is_empty() {
                    return Err(EngineError::InsufficientInventory(shortages));
                }
            }

            // All checks passed: create the usage rows.
            let mut usages: Vec<BlueprintUsage> = Vec::with_capacity(validated.len());
            let mut requirements: Vec<(Uuid, Vec<(Uuid, i64)>)> =
                Vec::with_capacity(validated.len());
            let mut total_cost = 0i64;
            let mut total_sale = 0i64;
            for entry in &validated {
                let mut usage =
                    BlueprintUsage::new(entry.blueprint_id, cmd.invoice_id, entry.sale_price_cents);
                usage.actual_materials_cost_cents = entry.materials_cents;
                usage.actual_labor_cost_cents = entry.labor_cents;
                usage.actual_overhead_cost_cents = entry.overhead_cents;
                usage.completed_at = entry.completed_at;
                usage.notes = entry.notes.clone();

                crate::blueprint_usages::ActiveModel::from(&usage)
                    .insert(&db_tx)
                    .await?;

                total_cost += usage.actual_cost_cents();
                total_sale += usage.actual_sale_price_cents;
                requirements.push((
                    usage.id,
                    items_per_blueprint
                        .get(&entry.blueprint_id.to_string())
                        .cloned()
                        .unwrap_or_default(),
                ));
                usages.push(usage);
            }

            if let Some(invoice_model) = &invoice_model {
                self.refresh_invoice_totals(&db_tx, invoice_model).await?;
            }

            let summary = BatchSummary {
                total_actual_cost_cents: total_cost,
                total_sale_price_cents: total_sale,
                projected_profit_cents: total_sale - total_cost,
            };

            Ok::<_, EngineError>((usages, requirements, summary))
        })?;

        // The usage rows are committed; deduction is best-effort from here.
        let mut deductions: Vec<InventoryDeduction> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut alerts: BTreeMap<Uuid, LowStockAlert> = BTreeMap::new();

        if cmd.deduct_inventory {
            for (usage_id, items) in &requirements {
                for (item_id, quantity) in items {
                    match self
                        .deduct_usage_requirement(&cmd.user_id, *usage_id, *item_id, *quantity)
                        .await
                    {
                        Ok((deduction, alert)) => {
                            if let Some(alert) = alert {
                                alerts.insert(alert.inventory_item_id, alert);
                            }
                            deductions.push(deduction);
                        }
                        Err(err) => {
                            tracing::warn!(
                                usage_id = %usage_id,
                                item_id = %item_id,
                                error = %err,
                                "inventory deduction skipped"
                            );
                            warnings.push(format!(
                                "inventory deduction skipped for item {item_id} (usage \
                                 {usage_id}): {err}"
                            ));
                        }
                    }
                }
            }
        }

        Ok(UsageBatchOutcome {
            usages,
            deductions,
            low_stock_alerts: alerts.into_values().collect(),
            summary,
            warnings,
        })
    }

    /// Apply one usage's requirement for one item: re-read, deduct, append
    /// the movement. Runs in its own small transaction so one failure never
    /// poisons the rest of the batch.
    async fn deduct_usage_requirement(
        &self,
        user_id: &str,
        usage_id: Uuid,
        item_id: Uuid,
        quantity: i64,
    ) -> ResultEngine<(InventoryDeduction, Option<LowStockAlert>)> {
        with_tx!(self, |db_tx| {
            let item = self.require_inventory_item(&db_tx, item_id, user_id).await?;
            let quantity_before = item.current_quantity;
            let new_quantity = quantity_before - quantity;
            if new_quantity < 0 {
                return Err(EngineError::InsufficientInventory(vec![Shortage {
                    inventory_item_id: item_id,
                    item_name: item.name.clone(),
                    current_quantity: quantity_before,
                    required_quantity: quantity,
                    shortage: quantity - quantity_before,
                }]));
            }

            let active = inventory_items::ActiveModel {
                id: ActiveValue::Set(item.id.clone()),
                current_quantity: ActiveValue::Set(new_quantity),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            let mut movement =
                crate::InventoryMovement::new(item_id, MovementType::BlueprintUsage, -quantity);
            movement.reference_id = Some(usage_id);
            movement.reference_type = Some("blueprint_usage".to_string());
            inventory_movements::ActiveModel::from(&movement)
                .insert(&db_tx)
                .await?;

            let is_low_stock = new_quantity <= item.minimum_quantity;
            let alert = is_low_stock.then(|| LowStockAlert {
                inventory_item_id: item_id,
                item_name: item.name.clone(),
                current_quantity: new_quantity,
                minimum_quantity: item.minimum_quantity,
            });

            Ok((
                InventoryDeduction {
                    inventory_item_id: item_id,
                    item_name: item.name,
                    blueprint_usage_id: usage_id,
                    quantity_deducted: quantity,
                    new_quantity,
                    is_low_stock,
                },
                alert,
            ))
        })
    }
}
