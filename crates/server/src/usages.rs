//! Blueprint-usage API endpoints.
//!
//! Single and batch creation are two typed routes; the engine only ever
//! sees a batch.

use api_types::usage::{
    CreateUsageBatchRequest, CreateUsageRequest, CreateUsageResponse, InventoryDeductionView,
    LowStockAlertView, UsageBatchSummaryView, UsageSpec as ApiUsageSpec, UsageView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_spec(spec: ApiUsageSpec) -> engine::UsageSpec {
    engine::UsageSpec {
        blueprint_id: spec.blueprint_id,
        actual_materials_cost_cents: spec.actual_materials_cost,
        actual_labor_cost_cents: spec.actual_labor_cost,
        actual_overhead_cost_cents: spec.actual_overhead_cost,
        actual_sale_price_cents: spec.actual_sale_price,
        completed_at: spec.completed_date.map(|dt| dt.with_timezone(&Utc)),
        notes: spec.notes,
    }
}

pub(crate) fn map_usage(usage: engine::BlueprintUsage) -> UsageView {
    UsageView {
        id: usage.id,
        blueprint_id: usage.blueprint_id,
        invoice_id: usage.invoice_id,
        actual_materials_cost: usage.actual_materials_cost_cents,
        actual_labor_cost: usage.actual_labor_cost_cents,
        actual_overhead_cost: usage.actual_overhead_cost_cents,
        actual_sale_price: usage.actual_sale_price_cents,
        completed_date: usage.completed_at.map(|dt| dt.fixed_offset()),
        notes: usage.notes,
    }
}

fn map_outcome(outcome: engine::UsageBatchOutcome) -> CreateUsageResponse {
    CreateUsageResponse {
        usages: outcome.usages.into_iter().map(map_usage).collect(),
        inventory_deductions: outcome
            .deductions
            .into_iter()
            .map(|d| InventoryDeductionView {
                inventory_item_id: d.inventory_item_id,
                item_name: d.item_name,
                blueprint_usage_id: d.blueprint_usage_id,
                quantity_deducted: d.quantity_deducted,
                new_quantity: d.new_quantity,
                is_low_stock: d.is_low_stock,
            })
            .collect(),
        low_stock_alerts: outcome
            .low_stock_alerts
            .into_iter()
            .map(|a| LowStockAlertView {
                inventory_item_id: a.inventory_item_id,
                item_name: a.item_name,
                current_quantity: a.current_quantity,
                minimum_quantity: a.minimum_quantity,
            })
            .collect(),
        summary: UsageBatchSummaryView {
            total_actual_cost: outcome.summary.total_actual_cost_cents,
            total_sale_price: outcome.summary.total_sale_price_cents,
            projected_profit: outcome.summary.projected_profit_cents,
        },
        warnings: outcome.warnings,
    }
}

async fn create(
    state: &ServerState,
    user: &user::Model,
    invoice_id: Option<Uuid>,
    deduct_inventory: Option<bool>,
    usages: Vec<ApiUsageSpec>,
) -> Result<CreateUsageResponse, ServerError> {
    let outcome = state
        .engine
        .create_blueprint_usages(engine::CreateUsagesCmd {
            user_id: user.username.clone(),
            invoice_id,
            usages: usages.into_iter().map(map_spec).collect(),
            deduct_inventory: deduct_inventory.unwrap_or(true),
        })
        .await?;
    Ok(map_outcome(outcome))
}

pub async fn create_single(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CreateUsageRequest>,
) -> Result<(StatusCode, Json<CreateUsageResponse>), ServerError> {
    let response = create(
        &state,
        &user,
        payload.invoice_id,
        payload.deduct_inventory,
        vec![payload.usage],
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn create_batch(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CreateUsageBatchRequest>,
) -> Result<(StatusCode, Json<CreateUsageResponse>), ServerError> {
    let response = create(
        &state,
        &user,
        payload.invoice_id,
        payload.deduct_inventory,
        payload.blueprint_usages,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}
