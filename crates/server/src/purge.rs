//! Bulk deletion API endpoints.

use api_types::purge::{PurgeInvoicesRequest, PurgeInvoicesResponse};
use api_types::usage::{PurgeUsagesRequest, PurgeUsagesResponse};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

pub async fn purge_invoices(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PurgeInvoicesRequest>,
) -> Result<Json<PurgeInvoicesResponse>, ServerError> {
    let report = state
        .engine
        .purge_invoices(&user.username, payload.confirm.unwrap_or(false))
        .await?;

    Ok(Json(PurgeInvoicesResponse {
        executed: report.executed,
        invoice_count: report.invoice_count,
        allocation_count: report.allocation_count,
        usage_count: report.usage_count,
        line_item_count: report.line_item_count,
        accounting_link_count: report.accounting_link_count,
        total_revenue: report.total_revenue_cents,
        total_cost: report.total_cost_cents,
        total_profit: report.total_profit_cents,
    }))
}

pub async fn purge_usages(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PurgeUsagesRequest>,
) -> Result<Json<PurgeUsagesResponse>, ServerError> {
    let report = state
        .engine
        .purge_blueprint_usages(&user.username, payload.confirm.unwrap_or(false))
        .await?;

    Ok(Json(PurgeUsagesResponse {
        executed: report.executed,
        usage_count: report.usage_count,
        expense_allocation_count: report.expense_allocation_count,
        total_actual_cost: report.total_actual_cost_cents,
        total_sale_price: report.total_sale_price_cents,
    }))
}
