//! Linking and unlinking bank transactions to blueprint-usage cost buckets.
//!
//! Upserts are keyed on `(blueprint_usage_id, transaction_id)`. After every
//! mutation the usage's three actual-cost buckets are recomputed as per-type
//! sums of its surviving expense allocations; a bucket with no rows of its
//! type becomes 0.

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    BlueprintUsage, EngineError, ExpenseAllocation, ExpenseType, LinkToUsageCmd, ResultEngine,
    UnlinkFromUsageCmd, blueprint_usages, commands::ExpenseAllocationRef, expense_allocations,
    util::parse_uuid,
};

use super::{Engine, OVER_ALLOCATION_TOLERANCE_CENTS, with_tx};

#[derive(Clone, Debug)]
pub struct UsageLinkOutcome {
    pub allocation: ExpenseAllocation,
    /// The owning usage with its recomputed cost buckets.
    pub usage: BlueprintUsage,
}

impl Engine {
    /// Link a transaction to one expense bucket of a blueprint usage.
    ///
    /// The over-allocation bound applies across the transaction's expense
    /// allocations the same way it does across its invoice allocations.
    pub async fn link_transaction_to_usage(
        &self,
        cmd: LinkToUsageCmd,
    ) -> ResultEngine<UsageLinkOutcome> {
        with_tx!(self, |db_tx| {
            let tx_model = self
                .require_transaction(&db_tx, cmd.transaction_id, &cmd.user_id)
                .await?;
            let usage_model = self
                .require_blueprint_usage(&db_tx, cmd.blueprint_usage_id, &cmd.user_id)
                .await?;

            let transaction_abs_cents = tx_model.amount_cents.abs();
            let amount_cents = match cmd.amount_cents {
                Some(amount) if amount <= 0 => {
                    return Err(EngineError::InvalidArgument(
                        "allocation_amount must be > 0".to_string(),
                    ));
                }
                Some(amount) => amount,
                None => transaction_abs_cents,
            };

            let existing = expense_allocations::Entity::find()
                .filter(
                    expense_allocations::Column::BlueprintUsageId
                        .eq(cmd.blueprint_usage_id.to_string()),
                )
                .filter(
                    expense_allocations::Column::TransactionId.eq(cmd.transaction_id.to_string()),
                )
                .one(&db_tx)
                .await?;

            let siblings: Vec<expense_allocations::Model> = expense_allocations::Entity::find()
                .filter(
                    expense_allocations::Column::TransactionId.eq(cmd.transaction_id.to_string()),
                )
                .all(&db_tx)
                .await?;
            let allocated_cents: i64 = siblings
                .iter()
                .filter(|model| existing.as_ref().is_none_or(|e| e.id != model.id))
                .map(|model| model.amount_cents)
                .sum();

            if allocated_cents + amount_cents
                > transaction_abs_cents + OVER_ALLOCATION_TOLERANCE_CENTS
            {
                return Err(EngineError::OverAllocation {
                    transaction_id: cmd.transaction_id,
                    transaction_cents: transaction_abs_cents,
                    allocated_cents,
                    attempted_cents: amount_cents,
                });
            }

            let allocation = match existing {
                Some(model) => {
                    let id = parse_uuid(&model.id, "expense allocation")?;
                    let active = expense_allocations::ActiveModel {
                        id: ActiveValue::Set(model.id),
                        amount_cents: ActiveValue::Set(amount_cents),
                        expense_type: ActiveValue::Set(cmd.expense_type.as_str().to_string()),
                        ..Default::default()
                    };
                    active.update(&db_tx).await?;
                    ExpenseAllocation {
                        id,
                        blueprint_usage_id: cmd.blueprint_usage_id,
                        transaction_id: cmd.transaction_id,
                        amount_cents,
                        expense_type: cmd.expense_type,
                    }
                }
                None => {
                    let allocation = ExpenseAllocation::new(
                        cmd.blueprint_usage_id,
                        cmd.transaction_id,
                        amount_cents,
                        cmd.expense_type,
                    );
                    expense_allocations::ActiveModel::from(&allocation)
                        .insert(&db_tx)
                        .await?;
                    allocation
                }
            };

            let usage = self.refresh_usage_costs(&db_tx, &usage_model).await?;

            Ok(UsageLinkOutcome { allocation, usage })
        })
    }

    /// Remove an expense allocation and recompute the usage's cost buckets.
    pub async fn unlink_transaction_from_usage(
        &self,
        cmd: UnlinkFromUsageCmd,
    ) -> ResultEngine<BlueprintUsage> {
        with_tx!(self, |db_tx| {
            let model = match cmd.selector {
                ExpenseAllocationRef::ById(id) => {
                    expense_allocations::Entity::find_by_id(id.to_string())
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| EngineError::NotFound(format!("expense allocation {id}")))?
                }
                ExpenseAllocationRef::ByPair {
                    transaction_id,
                    blueprint_usage_id,
                } => expense_allocations::Entity::find()
                    .filter(
                        expense_allocations::Column::BlueprintUsageId
                            .eq(blueprint_usage_id.to_string()),
                    )
                    .filter(
                        expense_allocations::Column::TransactionId.eq(transaction_id.to_string()),
                    )
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| {
                        EngineError::NotFound(format!(
                            "expense allocation for transaction {transaction_id} and usage \
                             {blueprint_usage_id}"
                        ))
                    })?,
            };

            let usage_id = parse_uuid(&model.blueprint_usage_id, "blueprint usage")?;
            let usage_model = self
                .require_blueprint_usage(&db_tx, usage_id, &cmd.user_id)
                .await?;

            let deleted = expense_allocations::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;
            if deleted.rows_affected == 0 {
                return Err(EngineError::Conflict(format!(
                    "expense allocation {} was already removed",
                    model.id
                )));
            }

            self.refresh_usage_costs(&db_tx, &usage_model).await
        })
    }

    /// Recompute a usage's actual-cost buckets from its expense allocations.
    ///
    /// Creation-time direct values persist only until the first link; from
    /// then on the buckets are always per-type sums (including all-zero
    /// after the last unlink).
    async fn refresh_usage_costs(
        &self,
        db: &sea_orm::DatabaseTransaction,
        usage_model: &blueprint_usages::Model,
    ) -> ResultEngine<BlueprintUsage> {
        let rows: Vec<expense_allocations::Model> = expense_allocations::Entity::find()
            .filter(expense_allocations::Column::BlueprintUsageId.eq(usage_model.id.clone()))
            .all(db)
            .await?;

        let mut materials = 0i64;
        let mut labor = 0i64;
        let mut overhead = 0i64;
        for row in &rows {
            match ExpenseType::try_from(row.expense_type.as_str())? {
                ExpenseType::Materials => materials += row.amount_cents,
                ExpenseType::Labor => labor += row.amount_cents,
                ExpenseType::Overhead => overhead += row.amount_cents,
            }
        }

        let active = blueprint_usages::ActiveModel {
            id: ActiveValue::Set(usage_model.id.clone()),
            actual_materials_cost_cents: ActiveValue::Set(materials),
            actual_labor_cost_cents: ActiveValue::Set(labor),
            actual_overhead_cost_cents: ActiveValue::Set(overhead),
            ..Default::default()
        };
        let updated = active.update(db).await?;

        BlueprintUsage::try_from(updated)
    }
}
