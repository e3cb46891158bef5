//! Reusable cost blueprints.
//!
//! A blueprint estimates what one unit of a type of work costs (materials /
//! labor / overhead) and what it should sell for. Its required inventory is
//! modeled by [`blueprint_items`](crate::blueprint_items).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub materials_cost_cents: i64,
    pub labor_cost_cents: i64,
    pub overhead_cost_cents: i64,
    pub target_sale_price_cents: i64,
}

impl Blueprint {
    pub fn new(user_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            materials_cost_cents: 0,
            labor_cost_cents: 0,
            overhead_cost_cents: 0,
            target_sale_price_cents: 0,
        }
    }

    /// Total estimated cost across the three buckets.
    pub fn estimated_cost_cents(&self) -> i64 {
        self.materials_cost_cents + self.labor_cost_cents + self.overhead_cost_cents
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "blueprints")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub materials_cost_cents: i64,
    pub labor_cost_cents: i64,
    pub overhead_cost_cents: i64,
    pub target_sale_price_cents: i64,
}

impl Model {
    pub fn estimated_cost_cents(&self) -> i64 {
        self.materials_cost_cents + self.labor_cost_cents + self.overhead_cost_cents
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Blueprint> for ActiveModel {
    fn from(blueprint: &Blueprint) -> Self {
        Self {
            id: ActiveValue::Set(blueprint.id.to_string()),
            user_id: ActiveValue::Set(blueprint.user_id.clone()),
            name: ActiveValue::Set(blueprint.name.clone()),
            materials_cost_cents: ActiveValue::Set(blueprint.materials_cost_cents),
            labor_cost_cents: ActiveValue::Set(blueprint.labor_cost_cents),
            overhead_cost_cents: ActiveValue::Set(blueprint.overhead_cost_cents),
            target_sale_price_cents: ActiveValue::Set(blueprint.target_sale_price_cents),
        }
    }
}

impl TryFrom<Model> for Blueprint {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "blueprint")?,
            user_id: model.user_id,
            name: model.name,
            materials_cost_cents: model.materials_cost_cents,
            labor_cost_cents: model.labor_cost_cents,
            overhead_cost_cents: model.overhead_cost_cents,
            target_sale_price_cents: model.target_sale_price_cents,
        })
    }
}
