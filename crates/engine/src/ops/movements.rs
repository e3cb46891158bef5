//! Movement audit listing.
//!
//! Cursor-paginated, newest → older by `(created_at DESC, id DESC)`. The
//! cursor is an opaque base64 blob handed back as `next_cursor`.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, InventoryMovement, MovementType, ResultEngine, inventory_movements};

use super::{Engine, with_tx};

/// Filters for listing inventory movements.
#[derive(Clone, Copy, Debug, Default)]
pub struct MovementListFilter {
    /// If present, only movements of this type are returned.
    pub movement_type: Option<MovementType>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct MovementsCursor {
    created_at: DateTime<Utc>,
    movement_id: String,
}

impl MovementsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid movements cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid movements cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid movements cursor".to_string()))
    }
}

impl Engine {
    /// Lists an item's movement history, with cursor-based pagination.
    pub async fn list_inventory_movements(
        &self,
        user_id: &str,
        inventory_item_id: Uuid,
        limit: u64,
        cursor: Option<&str>,
        filter: &MovementListFilter,
    ) -> ResultEngine<(Vec<InventoryMovement>, Option<String>)> {
        with_tx!(self, |db_tx| {
            self.require_inventory_item(&db_tx, inventory_item_id, user_id)
                .await?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = inventory_movements::Entity::find()
                .filter(
                    inventory_movements::Column::InventoryItemId.eq(inventory_item_id.to_string()),
                )
                .order_by_desc(inventory_movements::Column::CreatedAt)
                .order_by_desc(inventory_movements::Column::Id)
                .limit(limit_plus_one);

            if let Some(movement_type) = filter.movement_type {
                query = query.filter(
                    inventory_movements::Column::MovementType.eq(movement_type.as_str()),
                );
            }

            if let Some(cursor) = cursor {
                let cursor = MovementsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(inventory_movements::Column::CreatedAt.lt(cursor.created_at))
                        .add(
                            Condition::all()
                                .add(inventory_movements::Column::CreatedAt.eq(cursor.created_at))
                                .add(inventory_movements::Column::Id.lt(cursor.movement_id)),
                        ),
                );
            }

            let rows: Vec<inventory_movements::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<InventoryMovement> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                out.push(InventoryMovement::try_from(model)?);
            }

            let next_cursor = out.last().map(|movement| MovementsCursor {
                created_at: movement.created_at,
                movement_id: movement.id.to_string(),
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}
