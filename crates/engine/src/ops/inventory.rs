//! Manual inventory adjustments and the quantity projection rebuild.

use sea_orm::{ActiveValue, QueryFilter, Statement, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AdjustInventoryCmd, EngineError, InventoryMovement, MovementType, ResultEngine, Shortage,
    inventory_items, inventory_movements, util::normalize_optional_text,
};

use super::{Engine, with_tx};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InventoryStatus {
    pub quantity_before: i64,
    pub quantity_after: i64,
    pub is_low_stock: bool,
}

#[derive(Clone, Debug)]
pub struct AdjustmentOutcome {
    pub movement: InventoryMovement,
    pub status: InventoryStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecomputedItem {
    pub inventory_item_id: Uuid,
    pub quantity_before: i64,
    pub quantity_after: i64,
}

impl Engine {
    /// Apply a signed quantity change to an item and append the audit
    /// movement, in one DB transaction.
    ///
    /// The change is rejected when it would take the quantity below zero. A
    /// `purchase` carrying a unit cost also refreshes the item's stored
    /// unit cost.
    pub async fn adjust_inventory(
        &self,
        cmd: AdjustInventoryCmd,
    ) -> ResultEngine<AdjustmentOutcome> {
        if cmd.quantity_change == 0 {
            return Err(EngineError::InvalidArgument(
                "quantity_change must be non-zero".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let item = self
                .require_inventory_item(&db_tx, cmd.inventory_item_id, &cmd.user_id)
                .await?;

            let quantity_before = item.current_quantity;
            let quantity_after = quantity_before + cmd.quantity_change;
            if quantity_after < 0 {
                return Err(EngineError::InsufficientInventory(vec![Shortage {
                    inventory_item_id: cmd.inventory_item_id,
                    item_name: item.name,
                    current_quantity: quantity_before,
                    required_quantity: -cmd.quantity_change,
                    shortage: -quantity_after,
                }]));
            }

            let unit_cost_cents = match (cmd.movement_type, cmd.unit_cost_cents) {
                (MovementType::Purchase, Some(cost)) => ActiveValue::Set(cost),
                _ => ActiveValue::NotSet,
            };
            let active = inventory_items::ActiveModel {
                id: ActiveValue::Set(item.id.clone()),
                current_quantity: ActiveValue::Set(quantity_after),
                unit_cost_cents,
                ..Default::default()
            };
            active.update(&db_tx).await?;

            let mut movement = InventoryMovement::new(
                cmd.inventory_item_id,
                cmd.movement_type,
                cmd.quantity_change,
            );
            movement.unit_cost_cents = cmd.unit_cost_cents;
            movement.reference_id = cmd.reference_id;
            movement.reference_type = normalize_optional_text(cmd.reference_type.as_deref());
            movement.notes = normalize_optional_text(cmd.notes.as_deref());
            inventory_movements::ActiveModel::from(&movement)
                .insert(&db_tx)
                .await?;

            Ok(AdjustmentOutcome {
                movement,
                status: InventoryStatus {
                    quantity_before,
                    quantity_after,
                    is_low_stock: quantity_after <= item.minimum_quantity,
                },
            })
        })
    }

    /// Rebuild `current_quantity` from the movement log for one item or all
    /// of the caller's items.
    ///
    /// This is the repair path for the accepted window where usage rows
    /// exist without their deductions fully reflected; the movement log is
    /// the source of truth.
    pub async fn recompute_inventory_quantities(
        &self,
        user_id: &str,
        inventory_item_id: Option<Uuid>,
    ) -> ResultEngine<Vec<RecomputedItem>> {
        with_tx!(self, |db_tx| {
            let items: Vec<inventory_items::Model> = match inventory_item_id {
                Some(item_id) => {
                    vec![self.require_inventory_item(&db_tx, item_id, user_id).await?]
                }
                None => {
                    inventory_items::Entity::find()
                        .filter(inventory_items::Column::UserId.eq(user_id.to_string()))
                        .all(&db_tx)
                        .await?
                }
            };

            let backend = db_tx.get_database_backend();
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT COALESCE(SUM(quantity_change), 0) AS sum \
                     FROM inventory_movements \
                     WHERE inventory_item_id = ?",
                    vec![item.id.clone().into()],
                );
                let row = db_tx.query_one(stmt).await?;
                let quantity_after: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);

                let item_id = crate::util::parse_uuid(&item.id, "inventory item")?;
                if quantity_after != item.current_quantity {
                    let active = inventory_items::ActiveModel {
                        id: ActiveValue::Set(item.id.clone()),
                        current_quantity: ActiveValue::Set(quantity_after),
                        ..Default::default()
                    };
                    active.update(&db_tx).await?;
                }
                out.push(RecomputedItem {
                    inventory_item_id: item_id,
                    quantity_before: item.current_quantity,
                    quantity_after,
                });
            }

            Ok(out)
        })
    }
}
