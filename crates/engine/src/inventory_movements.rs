//! Inventory movement audit log.
//!
//! Append-only: one row per quantity change, never mutated, never deleted.
//! Rows survive purges of the usages they reference; `reference_id` /
//! `reference_type` are plain values rather than foreign keys so the history
//! stays intact when the referenced row is gone.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Purchase,
    Usage,
    Adjustment,
    Waste,
    Return,
    BlueprintUsage,
}

impl MovementType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Usage => "usage",
            Self::Adjustment => "adjustment",
            Self::Waste => "waste",
            Self::Return => "return",
            Self::BlueprintUsage => "blueprint_usage",
        }
    }
}

impl TryFrom<&str> for MovementType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "purchase" => Ok(Self::Purchase),
            "usage" => Ok(Self::Usage),
            "adjustment" => Ok(Self::Adjustment),
            "waste" => Ok(Self::Waste),
            "return" => Ok(Self::Return),
            "blueprint_usage" => Ok(Self::BlueprintUsage),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid movement type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub id: Uuid,
    pub inventory_item_id: Uuid,
    pub movement_type: MovementType,
    /// Signed quantity delta in integer units.
    pub quantity_change: i64,
    pub unit_cost_cents: Option<i64>,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryMovement {
    pub fn new(inventory_item_id: Uuid, movement_type: MovementType, quantity_change: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            inventory_item_id,
            movement_type,
            quantity_change,
            unit_cost_cents: None,
            reference_id: None,
            reference_type: None,
            notes: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub inventory_item_id: String,
    pub movement_type: String,
    pub quantity_change: i64,
    pub unit_cost_cents: Option<i64>,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&InventoryMovement> for ActiveModel {
    fn from(movement: &InventoryMovement) -> Self {
        Self {
            id: ActiveValue::Set(movement.id.to_string()),
            inventory_item_id: ActiveValue::Set(movement.inventory_item_id.to_string()),
            movement_type: ActiveValue::Set(movement.movement_type.as_str().to_string()),
            quantity_change: ActiveValue::Set(movement.quantity_change),
            unit_cost_cents: ActiveValue::Set(movement.unit_cost_cents),
            reference_id: ActiveValue::Set(movement.reference_id.map(|id| id.to_string())),
            reference_type: ActiveValue::Set(movement.reference_type.clone()),
            notes: ActiveValue::Set(movement.notes.clone()),
            created_at: ActiveValue::Set(movement.created_at),
        }
    }
}

impl TryFrom<Model> for InventoryMovement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "inventory movement")?,
            inventory_item_id: parse_uuid(&model.inventory_item_id, "inventory item")?,
            movement_type: MovementType::try_from(model.movement_type.as_str())?,
            quantity_change: model.quantity_change,
            unit_cost_cents: model.unit_cost_cents,
            reference_id: model
                .reference_id
                .as_deref()
                .map(|id| parse_uuid(id, "reference"))
                .transpose()?,
            reference_type: model.reference_type,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
