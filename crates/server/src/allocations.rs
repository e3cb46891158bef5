//! Allocation API endpoints.

use api_types::allocation::{
    AllocationView, ExpenseAllocationView, ExpenseType as ApiExpenseType, InvoiceTotalsView,
    LinkExpenseRequest, LinkExpenseResponse, LinkTransactionRequest, LinkTransactionResponse,
    UnlinkExpenseRequest, UnlinkExpenseResponse, UnlinkTransactionRequest,
    UnlinkTransactionResponse,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, usages::map_usage, user};

fn map_expense_type(expense_type: ApiExpenseType) -> engine::ExpenseType {
    match expense_type {
        ApiExpenseType::Materials => engine::ExpenseType::Materials,
        ApiExpenseType::Labor => engine::ExpenseType::Labor,
        ApiExpenseType::Overhead => engine::ExpenseType::Overhead,
    }
}

fn map_expense_type_back(expense_type: engine::ExpenseType) -> ApiExpenseType {
    match expense_type {
        engine::ExpenseType::Materials => ApiExpenseType::Materials,
        engine::ExpenseType::Labor => ApiExpenseType::Labor,
        engine::ExpenseType::Overhead => ApiExpenseType::Overhead,
    }
}

fn map_totals(totals: engine::InvoiceTotals) -> InvoiceTotalsView {
    InvoiceTotalsView {
        total_actual_cost: totals.total_actual_cost_cents,
        actual_profit: totals.actual_profit_cents,
    }
}

pub async fn link(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<LinkTransactionRequest>,
) -> Result<(StatusCode, Json<LinkTransactionResponse>), ServerError> {
    let outcome = state
        .engine
        .link_transaction_to_invoice(engine::LinkToInvoiceCmd {
            user_id: user.username.clone(),
            transaction_id: payload.transaction_id,
            invoice_id: payload.invoice_id,
            amount_cents: payload.allocation_amount,
            percentage: payload.allocation_percentage,
            notes: payload.notes,
        })
        .await?;

    let allocation = outcome.allocation;
    Ok((
        StatusCode::CREATED,
        Json(LinkTransactionResponse {
            allocation: AllocationView {
                id: allocation.id,
                transaction_id: allocation.transaction_id,
                invoice_id: allocation.invoice_id,
                allocation_amount: allocation.amount_cents,
                allocation_percentage: allocation.percentage,
                notes: allocation.notes,
            },
            invoice_totals_updated: map_totals(outcome.invoice_totals),
        }),
    ))
}

pub async fn unlink(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<UnlinkTransactionRequest>,
) -> Result<Json<UnlinkTransactionResponse>, ServerError> {
    let selector = match (payload.allocation_id, payload.transaction_id, payload.invoice_id) {
        (Some(id), None, None) => engine::AllocationRef::ById(id),
        (None, Some(transaction_id), Some(invoice_id)) => engine::AllocationRef::ByPair {
            transaction_id,
            invoice_id,
        },
        _ => {
            return Err(ServerError::Generic(
                "provide either allocation_id or the (transaction_id, invoice_id) pair"
                    .to_string(),
            ));
        }
    };

    let totals = state
        .engine
        .unlink_transaction_from_invoice(engine::UnlinkFromInvoiceCmd {
            user_id: user.username.clone(),
            selector,
        })
        .await?;

    Ok(Json(UnlinkTransactionResponse {
        invoice_totals_updated: map_totals(totals),
    }))
}

pub async fn link_expense(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<LinkExpenseRequest>,
) -> Result<(StatusCode, Json<LinkExpenseResponse>), ServerError> {
    let outcome = state
        .engine
        .link_transaction_to_usage(engine::LinkToUsageCmd {
            user_id: user.username.clone(),
            transaction_id: payload.transaction_id,
            blueprint_usage_id: payload.blueprint_usage_id,
            expense_type: map_expense_type(payload.expense_type),
            amount_cents: payload.allocation_amount,
        })
        .await?;

    let allocation = outcome.allocation;
    Ok((
        StatusCode::CREATED,
        Json(LinkExpenseResponse {
            allocation: ExpenseAllocationView {
                id: allocation.id,
                blueprint_usage_id: allocation.blueprint_usage_id,
                transaction_id: allocation.transaction_id,
                allocation_amount: allocation.amount_cents,
                expense_type: map_expense_type_back(allocation.expense_type),
            },
            usage: map_usage(outcome.usage),
        }),
    ))
}

pub async fn unlink_expense(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<UnlinkExpenseRequest>,
) -> Result<Json<UnlinkExpenseResponse>, ServerError> {
    let selector = match (
        payload.expense_allocation_id,
        payload.transaction_id,
        payload.blueprint_usage_id,
    ) {
        (Some(id), None, None) => engine::ExpenseAllocationRef::ById(id),
        (None, Some(transaction_id), Some(blueprint_usage_id)) => {
            engine::ExpenseAllocationRef::ByPair {
                transaction_id,
                blueprint_usage_id,
            }
        }
        _ => {
            return Err(ServerError::Generic(
                "provide either expense_allocation_id or the (transaction_id, \
                 blueprint_usage_id) pair"
                    .to_string(),
            ));
        }
    };

    let usage = state
        .engine
        .unlink_transaction_from_usage(engine::UnlinkFromUsageCmd {
            user_id: user.username.clone(),
            selector,
        })
        .await?;

    Ok(Json(UnlinkExpenseResponse {
        usage: map_usage(usage),
    }))
}
