//! Linking and unlinking bank transactions to invoices.
//!
//! The allocation-sum invariant is checked and the row written inside one DB
//! transaction, and the invoice's derived totals are recomputed as a fresh
//! aggregate in that same transaction. Recomputation is never incremental:
//! it re-reads the surviving allocations after the write.

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use serde::Serialize;

use crate::{
    Allocation, EngineError, LinkToInvoiceCmd, ResultEngine, UnlinkFromInvoiceCmd, allocations,
    commands::AllocationRef, invoices, util::normalize_optional_text, util::parse_uuid,
};

use super::{Engine, OVER_ALLOCATION_TOLERANCE_CENTS, with_tx};

/// Derived invoice totals after a mutation. Both `None` when the invoice has
/// no allocations left ("no cost data", not "zero cost").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub total_actual_cost_cents: Option<i64>,
    pub actual_profit_cents: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct InvoiceLinkOutcome {
    pub allocation: Allocation,
    pub invoice_totals: InvoiceTotals,
}

fn resolve_allocation_amount(
    transaction_abs_cents: i64,
    amount_cents: Option<i64>,
    percentage: Option<f64>,
) -> ResultEngine<i64> {
    match (amount_cents, percentage) {
        (Some(_), Some(_)) => Err(EngineError::InvalidArgument(
            "provide either allocation_amount or allocation_percentage, not both".to_string(),
        )),
        (Some(amount), None) => {
            if amount <= 0 {
                return Err(EngineError::InvalidArgument(
                    "allocation_amount must be > 0".to_string(),
                ));
            }
            Ok(amount)
        }
        (None, Some(pct)) => {
            if !(pct > 0.0 && pct <= 100.0) {
                return Err(EngineError::InvalidArgument(format!(
                    "allocation_percentage must be in (0, 100], got {pct}"
                )));
            }
            Ok((transaction_abs_cents as f64 * pct / 100.0).round() as i64)
        }
        (None, None) => Ok(transaction_abs_cents),
    }
}

impl Engine {
    /// Link a transaction to an invoice, with the full amount, a fixed
    /// amount, or a percentage split.
    ///
    /// Re-linking the same (transaction, invoice) pair updates the existing
    /// allocation instead of inserting a duplicate, and the replaced row is
    /// excluded from the over-allocation check.
    pub async fn link_transaction_to_invoice(
        &self,
        cmd: LinkToInvoiceCmd,
    ) -> ResultEngine<InvoiceLinkOutcome> {
        with_tx!(self, |db_tx| {
            let tx_model = self
                .require_transaction(&db_tx, cmd.transaction_id, &cmd.user_id)
                .await?;
            let invoice_model = self
                .require_invoice(&db_tx, cmd.invoice_id, &cmd.user_id)
                .await?;

            let transaction_abs_cents = tx_model.amount_cents.abs();
            let amount_cents =
                resolve_allocation_amount(transaction_abs_cents, cmd.amount_cents, cmd.percentage)?;

            let existing = allocations::Entity::find()
                .filter(allocations::Column::TransactionId.eq(cmd.transaction_id.to_string()))
                .filter(allocations::Column::InvoiceId.eq(cmd.invoice_id.to_string()))
                .one(&db_tx)
                .await?;

            // Sum of the transaction's *other* allocations, excluding the
            // row being replaced.
            let siblings: Vec<allocations::Model> = allocations::Entity::find()
                .filter(allocations::Column::TransactionId.eq(cmd.transaction_id.to_string()))
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

            let notes = normalize_optional_text(cmd.notes.as_deref());
            let allocation = match existing {
                Some(model) => {
                    let id = parse_uuid(&model.id, "allocation")?;
                    let active = allocations::ActiveModel {
                        id: ActiveValue::Set(model.id),
                        amount_cents: ActiveValue::Set(amount_cents),
                        percentage: ActiveValue::Set(cmd.percentage),
                        notes: ActiveValue::Set(notes.clone()),
                        ..Default::default()
                    };
                    active.update(&db_tx).await?;
                    Allocation {
                        id,
                        transaction_id: cmd.transaction_id,
                        invoice_id: cmd.invoice_id,
                        amount_cents,
                        percentage: cmd.percentage,
                        notes,
                    }
                }
                None => {
                    let mut allocation =
                        Allocation::new(cmd.transaction_id, cmd.invoice_id, amount_cents);
                    allocation.percentage = cmd.percentage;
                    allocation.notes = notes;
                    allocations::ActiveModel::from(&allocation)
                        .insert(&db_tx)
                        .await?;
                    allocation
                }
            };

            let invoice_totals = self.refresh_invoice_totals(&db_tx, &invoice_model).await?;

            Ok(InvoiceLinkOutcome {
                allocation,
                invoice_totals,
            })
        })
    }

    /// Remove an allocation and recompute the invoice's totals.
    ///
    /// Unlinking the only allocation resets both totals to `None`.
    pub async fn unlink_transaction_from_invoice(
        &self,
        cmd: UnlinkFromInvoiceCmd,
    ) -> ResultEngine<InvoiceTotals> {
        with_tx!(self, |db_tx| {
            let model = match cmd.selector {
                AllocationRef::ById(id) => allocations::Entity::find_by_id(id.to_string())
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("allocation {id}")))?,
                AllocationRef::ByPair {
                    transaction_id,
                    invoice_id,
                } => allocations::Entity::find()
                    .filter(allocations::Column::TransactionId.eq(transaction_id.to_string()))
                    .filter(allocations::Column::InvoiceId.eq(invoice_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| {
                        EngineError::NotFound(format!(
                            "allocation for transaction {transaction_id} and invoice {invoice_id}"
                        ))
                    })?,
            };

            let invoice_id = parse_uuid(&model.invoice_id, "invoice")?;
            let invoice_model = self
                .require_invoice(&db_tx, invoice_id, &cmd.user_id)
                .await?;

            let deleted = allocations::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;
            if deleted.rows_affected == 0 {
                return Err(EngineError::Conflict(format!(
                    "allocation {} was already removed",
                    model.id
                )));
            }

            self.refresh_invoice_totals(&db_tx, &invoice_model).await
        })
    }

    /// Recompute an invoice's derived totals from its surviving allocations.
    ///
    /// A manually overridden invoice is left untouched. The caller must have
    /// committed (or be about to commit) the allocation mutation on the same
    /// `db` handle: this is a fresh aggregate read, not an incremental
    /// update.
    pub(super) async fn refresh_invoice_totals(
        &self,
        db: &sea_orm::DatabaseTransaction,
        invoice_model: &invoices::Model,
    ) -> ResultEngine<InvoiceTotals> {
        if invoice_model.cost_override_by_user {
            return Ok(InvoiceTotals {
                total_actual_cost_cents: invoice_model.total_actual_cost_cents,
                actual_profit_cents: invoice_model.actual_profit_cents,
            });
        }

        let rows: Vec<allocations::Model> = allocations::Entity::find()
            .filter(allocations::Column::InvoiceId.eq(invoice_model.id.clone()))
            .all(db)
            .await?;

        let totals = if rows.is_empty() {
            InvoiceTotals {
                total_actual_cost_cents: None,
                actual_profit_cents: None,
            }
        } else {
            let total: i64 = rows.iter().map(|model| model.amount_cents).sum();
            InvoiceTotals {
                total_actual_cost_cents: Some(total),
                actual_profit_cents: Some(invoice_model.revenue_cents - total),
            }
        };

        let active = invoices::ActiveModel {
            id: ActiveValue::Set(invoice_model.id.clone()),
            total_actual_cost_cents: ActiveValue::Set(totals.total_actual_cost_cents),
            actual_profit_cents: ActiveValue::Set(totals.actual_profit_cents),
            ..Default::default()
        };
        active.update(db).await?;

        Ok(totals)
    }
}
