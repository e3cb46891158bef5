//! Profit views over the reconciliation rules.
//!
//! The single-invoice view fetches that invoice's signals and calls
//! [`reconcile`]; the portfolio view loads each table once, groups rows by
//! invoice in memory and reconciles per invoice without further queries.

use std::collections::HashMap;

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CostSource, ProfitBreakdown, ReconcileInputs, ResultEngine, allocations, blueprint_usages,
    blueprints, invoices, reconcile,
};

use super::{Engine, with_tx};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvoiceProfit {
    pub invoice_id: Uuid,
    pub revenue_cents: i64,
    pub breakdown: ProfitBreakdown,
    /// Sum of the invoice's transaction allocations.
    pub transaction_cost_cents: i64,
    /// Sum of the invoice's blueprint-usage costs (0 without usages).
    pub blueprint_cost_cents: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortfolioSummary {
    pub invoice_count: u64,
    pub total_revenue_cents: i64,
    pub total_cost_cents: i64,
    pub total_profit_cents: i64,
    /// Mean of the per-invoice margins; 0 without invoices.
    pub average_margin: f64,
    pub override_count: u64,
    pub transaction_costed_count: u64,
    pub blueprint_costed_count: u64,
    pub uncosted_count: u64,
}

/// Cost of one usage: its actual buckets when any are set, its blueprint's
/// estimate otherwise.
fn usage_cost_cents(
    usage: &blueprint_usages::Model,
    blueprints_by_id: &HashMap<String, blueprints::Model>,
) -> i64 {
    let actual = usage.actual_cost_cents();
    if actual > 0 {
        return actual;
    }
    blueprints_by_id
        .get(&usage.blueprint_id)
        .map(blueprints::Model::estimated_cost_cents)
        .unwrap_or(0)
}

fn inputs_for(
    invoice: &invoices::Model,
    transaction_cost_cents: i64,
    blueprint_cost_cents: Option<i64>,
) -> ReconcileInputs {
    ReconcileInputs {
        revenue_cents: invoice.revenue_cents,
        override_cost_cents: invoice
            .cost_override_by_user
            .then_some(invoice.total_actual_cost_cents)
            .flatten(),
        transaction_cost_cents,
        blueprint_cost_cents,
    }
}

impl Engine {
    /// Effective cost / profit / margin / variance for one invoice.
    pub async fn invoice_profit(
        &self,
        user_id: &str,
        invoice_id: Uuid,
    ) -> ResultEngine<InvoiceProfit> {
        with_tx!(self, |db_tx| {
            let invoice = self.require_invoice(&db_tx, invoice_id, user_id).await?;

            let allocation_rows: Vec<allocations::Model> = allocations::Entity::find()
                .filter(allocations::Column::InvoiceId.eq(invoice.id.clone()))
                .all(&db_tx)
                .await?;
            let transaction_cost_cents: i64 =
                allocation_rows.iter().map(|row| row.amount_cents).sum();

            let usage_rows: Vec<blueprint_usages::Model> = blueprint_usages::Entity::find()
                .filter(blueprint_usages::Column::InvoiceId.eq(invoice.id.clone()))
                .all(&db_tx)
                .await?;
            let blueprint_ids: Vec<String> = usage_rows
                .iter()
                .map(|row| row.blueprint_id.clone())
                .collect();
            let blueprints_by_id: HashMap<String, blueprints::Model> = blueprints::Entity::find()
                .filter(blueprints::Column::Id.is_in(blueprint_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| (model.id.clone(), model))
                .collect();

            let blueprint_cost_cents: i64 = usage_rows
                .iter()
                .map(|usage| usage_cost_cents(usage, &blueprints_by_id))
                .sum();

            let blueprint_input = (!usage_rows.is_empty()).then_some(blueprint_cost_cents);
            let breakdown = reconcile(inputs_for(&invoice, transaction_cost_cents, blueprint_input));

            Ok(InvoiceProfit {
                invoice_id,
                revenue_cents: invoice.revenue_cents,
                breakdown,
                transaction_cost_cents,
                blueprint_cost_cents,
            })
        })
    }

    /// Aggregate profitability across all of the caller's invoices.
    ///
    /// One query per table; no per-invoice round trips.
    pub async fn portfolio_summary(&self, user_id: &str) -> ResultEngine<PortfolioSummary> {
        with_tx!(self, |db_tx| {
            let invoice_rows: Vec<invoices::Model> = invoices::Entity::find()
                .filter(invoices::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;
            let invoice_ids: Vec<String> = invoice_rows.iter().map(|row| row.id.clone()).collect();

            let mut allocation_sums: HashMap<String, i64> = HashMap::new();
            let allocation_rows: Vec<allocations::Model> = allocations::Entity::find()
                .filter(allocations::Column::InvoiceId.is_in(invoice_ids.clone()))
                .all(&db_tx)
                .await?;
            for row in allocation_rows {
                *allocation_sums.entry(row.invoice_id).or_insert(0) += row.amount_cents;
            }

            let usage_rows: Vec<blueprint_usages::Model> = blueprint_usages::Entity::find()
                .filter(blueprint_usages::Column::InvoiceId.is_in(invoice_ids))
                .all(&db_tx)
                .await?;
            let blueprint_ids: Vec<String> = usage_rows
                .iter()
                .map(|row| row.blueprint_id.clone())
                .collect();
            let blueprints_by_id: HashMap<String, blueprints::Model> = blueprints::Entity::find()
                .filter(blueprints::Column::Id.is_in(blueprint_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| (model.id.clone(), model))
                .collect();

            let mut usage_sums: HashMap<String, i64> = HashMap::new();
            for usage in &usage_rows {
                let Some(invoice_id) = usage.invoice_id.clone() else {
                    continue;
                };
                *usage_sums.entry(invoice_id).or_insert(0) +=
                    usage_cost_cents(usage, &blueprints_by_id);
            }

            let mut summary = PortfolioSummary::default();
            let mut margin_sum = 0.0f64;
            for invoice in &invoice_rows {
                let transaction_cost = allocation_sums.get(&invoice.id).copied().unwrap_or(0);
                let blueprint_cost = usage_sums.get(&invoice.id).copied();
                let breakdown = reconcile(inputs_for(invoice, transaction_cost, blueprint_cost));

                summary.invoice_count += 1;
                summary.total_revenue_cents += invoice.revenue_cents;
                summary.total_cost_cents += breakdown.effective_cost_cents;
                summary.total_profit_cents += breakdown.profit_cents;
                margin_sum += breakdown.margin;
                match breakdown.cost_source {
                    CostSource::Override => summary.override_count += 1,
                    CostSource::Transactions => summary.transaction_costed_count += 1,
                    CostSource::Blueprint => summary.blueprint_costed_count += 1,
                    CostSource::None => summary.uncosted_count += 1,
                }
            }
            if summary.invoice_count > 0 {
                summary.average_margin = margin_sum / summary.invoice_count as f64;
            }

            Ok(summary)
        })
    }
}
