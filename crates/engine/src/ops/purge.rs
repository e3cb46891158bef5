//! Bulk deletion with mandatory confirmation.
//!
//! Without `confirm` both purges are dry runs: zero writes, and the report
//! describes what an executed purge would remove. Executed purges delete
//! dependents before parents and return the pre-deletion aggregates as the
//! audit trail. The inventory movement log is never touched.

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{ResultEngine, accounting_links, allocations, blueprint_usages, blueprints,
    expense_allocations, invoices, line_items};

use super::{Engine, with_tx};

/// Pre-deletion snapshot of everything `purge_invoices` touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InvoicePurgeReport {
    pub executed: bool,
    pub invoice_count: u64,
    pub allocation_count: u64,
    pub usage_count: u64,
    pub line_item_count: u64,
    pub accounting_link_count: u64,
    pub total_revenue_cents: i64,
    pub total_cost_cents: i64,
    pub total_profit_cents: i64,
}

/// Pre-deletion snapshot of everything `purge_blueprint_usages` touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsagePurgeReport {
    pub executed: bool,
    pub usage_count: u64,
    pub expense_allocation_count: u64,
    pub total_actual_cost_cents: i64,
    pub total_sale_price_cents: i64,
}

impl Engine {
    /// Delete all of the caller's invoices and their dependent rows.
    ///
    /// Deletion order: expense allocations of invoice-linked usages, those
    /// usages, allocations, line items, accounting links, then the invoices.
    pub async fn purge_invoices(
        &self,
        user_id: &str,
        confirm: bool,
    ) -> ResultEngine<InvoicePurgeReport> {
        with_tx!(self, |db_tx| {
            let invoice_rows: Vec<invoices::Model> = invoices::Entity::find()
                .filter(invoices::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;
            let invoice_ids: Vec<String> = invoice_rows.iter().map(|row| row.id.clone()).collect();

            let usage_rows: Vec<blueprint_usages::Model> = blueprint_usages::Entity::find()
                .filter(blueprint_usages::Column::InvoiceId.is_in(invoice_ids.clone()))
                .all(&db_tx)
                .await?;
            let usage_ids: Vec<String> = usage_rows.iter().map(|row| row.id.clone()).collect();

            let allocation_count = allocations::Entity::find()
                .filter(allocations::Column::InvoiceId.is_in(invoice_ids.clone()))
                .count(&db_tx)
                .await?;
            let line_item_count = line_items::Entity::find()
                .filter(line_items::Column::InvoiceId.is_in(invoice_ids.clone()))
                .count(&db_tx)
                .await?;
            let accounting_link_count = accounting_links::Entity::find()
                .filter(accounting_links::Column::InvoiceId.is_in(invoice_ids.clone()))
                .count(&db_tx)
                .await?;

            let mut report = InvoicePurgeReport {
                executed: confirm,
                invoice_count: invoice_rows.len() as u64,
                allocation_count,
                usage_count: usage_rows.len() as u64,
                line_item_count,
                accounting_link_count,
                ..Default::default()
            };
            for invoice in &invoice_rows {
                report.total_revenue_cents += invoice.revenue_cents;
                report.total_cost_cents += invoice.total_actual_cost_cents.unwrap_or(0);
                report.total_profit_cents += invoice.actual_profit_cents.unwrap_or(0);
            }

            if !confirm {
                return Ok(report);
            }

            expense_allocations::Entity::delete_many()
                .filter(expense_allocations::Column::BlueprintUsageId.is_in(usage_ids))
                .exec(&db_tx)
                .await?;
            blueprint_usages::Entity::delete_many()
                .filter(blueprint_usages::Column::InvoiceId.is_in(invoice_ids.clone()))
                .exec(&db_tx)
                .await?;
            allocations::Entity::delete_many()
                .filter(allocations::Column::InvoiceId.is_in(invoice_ids.clone()))
                .exec(&db_tx)
                .await?;
            line_items::Entity::delete_many()
                .filter(line_items::Column::InvoiceId.is_in(invoice_ids.clone()))
                .exec(&db_tx)
                .await?;
            accounting_links::Entity::delete_many()
                .filter(accounting_links::Column::InvoiceId.is_in(invoice_ids))
                .exec(&db_tx)
                .await?;
            invoices::Entity::delete_many()
                .filter(invoices::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;

            Ok(report)
        })
    }

    /// Delete all of the caller's blueprint usages (their expense
    /// allocations first). Consumed inventory is not restocked: the
    /// movement log keeps the history.
    pub async fn purge_blueprint_usages(
        &self,
        user_id: &str,
        confirm: bool,
    ) -> ResultEngine<UsagePurgeReport> {
        with_tx!(self, |db_tx| {
            let blueprint_ids: Vec<String> = blueprints::Entity::find()
                .filter(blueprints::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| model.id)
                .collect();

            let usage_rows: Vec<blueprint_usages::Model> = blueprint_usages::Entity::find()
                .filter(blueprint_usages::Column::BlueprintId.is_in(blueprint_ids))
                .all(&db_tx)
                .await?;
            let usage_ids: Vec<String> = usage_rows.iter().map(|row| row.id.clone()).collect();

            let expense_allocation_count = expense_allocations::Entity::find()
                .filter(expense_allocations::Column::BlueprintUsageId.is_in(usage_ids.clone()))
                .count(&db_tx)
                .await?;

            let mut report = UsagePurgeReport {
                executed: confirm,
                usage_count: usage_rows.len() as u64,
                expense_allocation_count,
                ..Default::default()
            };
            for usage in &usage_rows {
                report.total_actual_cost_cents += usage.actual_cost_cents();
                report.total_sale_price_cents += usage.actual_sale_price_cents;
            }

            if !confirm {
                return Ok(report);
            }

            expense_allocations::Entity::delete_many()
                .filter(expense_allocations::Column::BlueprintUsageId.is_in(usage_ids.clone()))
                .exec(&db_tx)
                .await?;
            blueprint_usages::Entity::delete_many()
                .filter(blueprint_usages::Column::Id.is_in(usage_ids))
                .exec(&db_tx)
                .await?;

            Ok(report)
        })
    }
}
