//! Physical inventory items.
//!
//! `current_quantity` is a cached projection of the movement log
//! ([`inventory_movements`](crate::inventory_movements)); the consumption and
//! adjustment ops keep the two consistent by writing both in one DB
//! transaction, and `recompute_inventory_quantities` rebuilds the projection
//! from the log. Quantities are integer units and never go negative through
//! this engine.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub current_quantity: i64,
    pub minimum_quantity: i64,
    /// Integer cents.
    pub unit_cost_cents: i64,
}

impl InventoryItem {
    pub fn new(user_id: String, name: String, current_quantity: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            current_quantity,
            minimum_quantity: 0,
            unit_cost_cents: 0,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.current_quantity <= self.minimum_quantity
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub current_quantity: i64,
    pub minimum_quantity: i64,
    pub unit_cost_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&InventoryItem> for ActiveModel {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            user_id: ActiveValue::Set(item.user_id.clone()),
            name: ActiveValue::Set(item.name.clone()),
            current_quantity: ActiveValue::Set(item.current_quantity),
            minimum_quantity: ActiveValue::Set(item.minimum_quantity),
            unit_cost_cents: ActiveValue::Set(item.unit_cost_cents),
        }
    }
}

impl TryFrom<Model> for InventoryItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "inventory item")?,
            user_id: model.user_id,
            name: model.name,
            current_quantity: model.current_quantity,
            minimum_quantity: model.minimum_quantity,
            unit_cost_cents: model.unit_cost_cents,
        })
    }
}
