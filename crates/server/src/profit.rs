//! Profit API endpoints.

use api_types::profit::{
    CostSource as ApiCostSource, PortfolioSummaryView, ProfitRequest, ProfitView,
};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

fn map_cost_source(source: engine::CostSource) -> ApiCostSource {
    match source {
        engine::CostSource::Override => ApiCostSource::Override,
        engine::CostSource::Transactions => ApiCostSource::Transactions,
        engine::CostSource::Blueprint => ApiCostSource::Blueprint,
        engine::CostSource::None => ApiCostSource::None,
    }
}

pub async fn invoice_profit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfitRequest>,
) -> Result<Json<ProfitView>, ServerError> {
    let profit = state
        .engine
        .invoice_profit(&user.username, payload.invoice_id)
        .await?;

    Ok(Json(ProfitView {
        invoice_id: profit.invoice_id,
        revenue: profit.revenue_cents,
        effective_cost: profit.breakdown.effective_cost_cents,
        profit: profit.breakdown.profit_cents,
        margin: profit.breakdown.margin,
        cost_source: map_cost_source(profit.breakdown.cost_source),
        transaction_cost: profit.transaction_cost_cents,
        blueprint_cost: profit.blueprint_cost_cents,
        estimated_profit: profit.breakdown.estimated_profit_cents,
        variance: profit.breakdown.variance_cents,
    }))
}

pub async fn summary(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<PortfolioSummaryView>, ServerError> {
    let summary = state.engine.portfolio_summary(&user.username).await?;

    Ok(Json(PortfolioSummaryView {
        invoice_count: summary.invoice_count,
        total_revenue: summary.total_revenue_cents,
        total_cost: summary.total_cost_cents,
        total_profit: summary.total_profit_cents,
        average_margin: summary.average_margin,
        override_count: summary.override_count,
        transaction_costed_count: summary.transaction_costed_count,
        blueprint_costed_count: summary.blueprint_costed_count,
        uncosted_count: summary.uncosted_count,
    }))
}
