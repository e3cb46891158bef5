//! Inventory requirements of a blueprint.
//!
//! One row per (blueprint, inventory item): producing one unit of the
//! blueprint consumes `quantity_required` units of the item.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintItem {
    pub id: Uuid,
    pub blueprint_id: Uuid,
    pub inventory_item_id: Uuid,
    pub quantity_required: i64,
}

impl BlueprintItem {
    pub fn new(blueprint_id: Uuid, inventory_item_id: Uuid, quantity_required: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            blueprint_id,
            inventory_item_id,
            quantity_required,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blueprint_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub blueprint_id: String,
    pub inventory_item_id: String,
    pub quantity_required: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BlueprintItem> for ActiveModel {
    fn from(item: &BlueprintItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            blueprint_id: ActiveValue::Set(item.blueprint_id.to_string()),
            inventory_item_id: ActiveValue::Set(item.inventory_item_id.to_string()),
            quantity_required: ActiveValue::Set(item.quantity_required),
        }
    }
}

impl TryFrom<Model> for BlueprintItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "blueprint item")?,
            blueprint_id: parse_uuid(&model.blueprint_id, "blueprint")?,
            inventory_item_id: parse_uuid(&model.inventory_item_id, "inventory item")?,
            quantity_required: model.quantity_required,
        })
    }
}
