//! Inventory API endpoints.

use api_types::inventory::{
    AdjustInventoryRequest, AdjustInventoryResponse, InventoryStatusView, MovementListRequest,
    MovementListResponse, MovementType as ApiMovementType, MovementView,
    RecomputeQuantitiesRequest, RecomputeQuantitiesResponse, RecomputedItemView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, user};

fn map_movement_type(movement_type: ApiMovementType) -> engine::MovementType {
    match movement_type {
        ApiMovementType::Purchase => engine::MovementType::Purchase,
        ApiMovementType::Usage => engine::MovementType::Usage,
        ApiMovementType::Adjustment => engine::MovementType::Adjustment,
        ApiMovementType::Waste => engine::MovementType::Waste,
        ApiMovementType::Return => engine::MovementType::Return,
        ApiMovementType::BlueprintUsage => engine::MovementType::BlueprintUsage,
    }
}

fn map_movement_type_back(movement_type: engine::MovementType) -> ApiMovementType {
    match movement_type {
        engine::MovementType::Purchase => ApiMovementType::Purchase,
        engine::MovementType::Usage => ApiMovementType::Usage,
        engine::MovementType::Adjustment => ApiMovementType::Adjustment,
        engine::MovementType::Waste => ApiMovementType::Waste,
        engine::MovementType::Return => ApiMovementType::Return,
        engine::MovementType::BlueprintUsage => ApiMovementType::BlueprintUsage,
    }
}

fn map_movement(movement: engine::InventoryMovement) -> MovementView {
    MovementView {
        id: movement.id,
        inventory_item_id: movement.inventory_item_id,
        transaction_type: map_movement_type_back(movement.movement_type),
        quantity_change: movement.quantity_change,
        unit_cost: movement.unit_cost_cents,
        reference_id: movement.reference_id,
        reference_type: movement.reference_type,
        notes: movement.notes,
        created_at: movement.created_at.fixed_offset(),
    }
}

pub async fn adjust(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AdjustInventoryRequest>,
) -> Result<(StatusCode, Json<AdjustInventoryResponse>), ServerError> {
    let outcome = state
        .engine
        .adjust_inventory(engine::AdjustInventoryCmd {
            user_id: user.username.clone(),
            inventory_item_id: payload.inventory_item_id,
            movement_type: map_movement_type(payload.transaction_type),
            quantity_change: payload.quantity_change,
            unit_cost_cents: payload.unit_cost,
            reference_id: payload.reference_id,
            reference_type: payload.reference_type,
            notes: payload.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdjustInventoryResponse {
            inventory_transaction: map_movement(outcome.movement),
            inventory_status: InventoryStatusView {
                quantity_before: outcome.status.quantity_before,
                quantity_after: outcome.status.quantity_after,
                is_low_stock: outcome.status.is_low_stock,
            },
        }),
    ))
}

pub async fn movements(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<MovementListRequest>,
) -> Result<Json<MovementListResponse>, ServerError> {
    let filter = engine::MovementListFilter {
        movement_type: payload.transaction_type.map(map_movement_type),
    };
    let (movements, next_cursor) = state
        .engine
        .list_inventory_movements(
            &user.username,
            payload.inventory_item_id,
            payload.limit.unwrap_or(50),
            payload.cursor.as_deref(),
            &filter,
        )
        .await?;

    Ok(Json(MovementListResponse {
        movements: movements.into_iter().map(map_movement).collect(),
        next_cursor,
    }))
}

pub async fn recompute(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RecomputeQuantitiesRequest>,
) -> Result<Json<RecomputeQuantitiesResponse>, ServerError> {
    let items = state
        .engine
        .recompute_inventory_quantities(&user.username, payload.inventory_item_id)
        .await?;

    Ok(Json(RecomputeQuantitiesResponse {
        items: items
            .into_iter()
            .map(|item| RecomputedItemView {
                inventory_item_id: item.inventory_item_id,
                quantity_before: item.quantity_before,
                quantity_after: item.quantity_after,
            })
            .collect(),
    }))
}
