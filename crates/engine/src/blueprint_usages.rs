//! Blueprint usages.
//!
//! One row per concrete instantiation of a blueprint, optionally tied to an
//! invoice. The three actual-cost buckets start as the values given at
//! creation; once any expense allocation is linked they become per-type sums
//! of the usage's expense allocations and stay sums from then on.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintUsage {
    pub id: Uuid,
    pub blueprint_id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub actual_materials_cost_cents: i64,
    pub actual_labor_cost_cents: i64,
    pub actual_overhead_cost_cents: i64,
    pub actual_sale_price_cents: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl BlueprintUsage {
    pub fn new(blueprint_id: Uuid, invoice_id: Option<Uuid>, actual_sale_price_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            blueprint_id,
            invoice_id,
            actual_materials_cost_cents: 0,
            actual_labor_cost_cents: 0,
            actual_overhead_cost_cents: 0,
            actual_sale_price_cents,
            completed_at: None,
            notes: None,
        }
    }

    /// Total actual cost across the three buckets.
    pub fn actual_cost_cents(&self) -> i64 {
        self.actual_materials_cost_cents
            + self.actual_labor_cost_cents
            + self.actual_overhead_cost_cents
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "blueprint_usages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub blueprint_id: String,
    pub invoice_id: Option<String>,
    pub actual_materials_cost_cents: i64,
    pub actual_labor_cost_cents: i64,
    pub actual_overhead_cost_cents: i64,
    pub actual_sale_price_cents: i64,
    pub completed_at: Option<DateTimeUtc>,
    pub notes: Option<String>,
}

impl Model {
    pub fn actual_cost_cents(&self) -> i64 {
        self.actual_materials_cost_cents
            + self.actual_labor_cost_cents
            + self.actual_overhead_cost_cents
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BlueprintUsage> for ActiveModel {
    fn from(usage: &BlueprintUsage) -> Self {
        Self {
            id: ActiveValue::Set(usage.id.to_string()),
            blueprint_id: ActiveValue::Set(usage.blueprint_id.to_string()),
            invoice_id: ActiveValue::Set(usage.invoice_id.map(|id| id.to_string())),
            actual_materials_cost_cents: ActiveValue::Set(usage.actual_materials_cost_cents),
            actual_labor_cost_cents: ActiveValue::Set(usage.actual_labor_cost_cents),
            actual_overhead_cost_cents: ActiveValue::Set(usage.actual_overhead_cost_cents),
            actual_sale_price_cents: ActiveValue::Set(usage.actual_sale_price_cents),
            completed_at: ActiveValue::Set(usage.completed_at),
            notes: ActiveValue::Set(usage.notes.clone()),
        }
    }
}

impl TryFrom<Model> for BlueprintUsage {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "blueprint usage")?,
            blueprint_id: parse_uuid(&model.blueprint_id, "blueprint")?,
            invoice_id: model
                .invoice_id
                .as_deref()
                .map(|id| parse_uuid(id, "invoice"))
                .transpose()?,
            actual_materials_cost_cents: model.actual_materials_cost_cents,
            actual_labor_cost_cents: model.actual_labor_cost_cents,
            actual_overhead_cost_cents: model.actual_overhead_cost_cents,
            actual_sale_price_cents: model.actual_sale_price_cents,
            completed_at: model.completed_at,
            notes: model.notes,
        })
    }
}
