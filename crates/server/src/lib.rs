use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::error::{ErrorBody, OverAllocationView, ShortageView};
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod allocations;
mod inventory;
mod profit;
mod purge;
mod server;
mod usages;
pub mod user;

pub mod types {
    pub mod allocation {
        pub use api_types::allocation::{
            AllocationView, ExpenseAllocationView, ExpenseType, InvoiceTotalsView,
            LinkExpenseRequest, LinkExpenseResponse, LinkTransactionRequest,
            LinkTransactionResponse, UnlinkExpenseRequest, UnlinkExpenseResponse,
            UnlinkTransactionRequest, UnlinkTransactionResponse,
        };
    }

    pub mod usage {
        pub use api_types::usage::{
            CreateUsageBatchRequest, CreateUsageRequest, CreateUsageResponse,
            InventoryDeductionView, LowStockAlertView, PurgeUsagesRequest, PurgeUsagesResponse,
            UsageBatchSummaryView, UsageSpec, UsageView,
        };
    }

    pub mod inventory {
        pub use api_types::inventory::{
            AdjustInventoryRequest, AdjustInventoryResponse, InventoryStatusView,
            MovementListRequest, MovementListResponse, MovementType, MovementView,
            RecomputeQuantitiesRequest, RecomputeQuantitiesResponse, RecomputedItemView,
        };
    }

    pub mod profit {
        pub use api_types::profit::{
            CostSource, PortfolioSummaryView, ProfitRequest, ProfitView,
        };
    }

    pub mod purge {
        pub use api_types::purge::{PurgeInvoicesRequest, PurgeInvoicesResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidArgument(_)
        | EngineError::InsufficientInventory(_)
        | EngineError::OverAllocation { .. }
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Builds the JSON error body, carrying the structured detail for the error
/// kinds that have one. Database errors are logged and redacted.
fn body_for_engine_error(err: EngineError) -> ErrorBody {
    let mut body = ErrorBody {
        error: err.to_string(),
        shortages: None,
        over_allocation: None,
    };
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            body.error = "internal server error".to_string();
        }
        EngineError::InsufficientInventory(shortages) => {
            body.shortages = Some(
                shortages
                    .into_iter()
                    .map(|s| ShortageView {
                        inventory_item_id: s.inventory_item_id,
                        item_name: s.item_name,
                        current_quantity: s.current_quantity,
                        required_quantity: s.required_quantity,
                        shortage: s.shortage,
                    })
                    .collect(),
            );
        }
        EngineError::OverAllocation {
            transaction_id,
            transaction_cents,
            allocated_cents,
            attempted_cents,
        } => {
            body.over_allocation = Some(OverAllocationView {
                transaction_id,
                transaction_amount: transaction_cents,
                allocated_amount: allocated_cents,
                attempted_amount: attempted_cents,
            });
        }
        _ => {}
    }
    body
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(err) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: err,
                    shortages: None,
                    over_allocation: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("invoice x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res =
            ServerError::from(EngineError::InvalidArgument("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn over_allocation_maps_to_422() {
        let res = ServerError::from(EngineError::OverAllocation {
            transaction_id: Uuid::new_v4(),
            transaction_cents: 1000,
            allocated_cents: 900,
            attempted_cents: 200,
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn insufficient_inventory_maps_to_422() {
        let res = ServerError::from(EngineError::InsufficientInventory(vec![engine::Shortage {
            inventory_item_id: Uuid::new_v4(),
            item_name: "resin".to_string(),
            current_quantity: 15,
            required_quantity: 20,
            shortage: 5,
        }]))
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
