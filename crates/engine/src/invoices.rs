//! Invoice (job) records.
//!
//! `total_actual_cost_cents` and `actual_profit_cents` are derived: the
//! allocation ops recompute them as fresh aggregates after every mutation.
//! Both are nullable so "no cost data" stays distinguishable from a known
//! zero cost. When `cost_override_by_user` is set the stored total is the
//! operator-entered value and the refresh path leaves both fields alone.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub user_id: String,
    pub customer_name: String,
    /// Integer cents.
    pub revenue_cents: i64,
    pub total_actual_cost_cents: Option<i64>,
    pub actual_profit_cents: Option<i64>,
    pub cost_override_by_user: bool,
}

impl Invoice {
    pub fn new(user_id: String, customer_name: String, revenue_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            customer_name,
            revenue_cents,
            total_actual_cost_cents: None,
            actual_profit_cents: None,
            cost_override_by_user: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub customer_name: String,
    pub revenue_cents: i64,
    pub total_actual_cost_cents: Option<i64>,
    pub actual_profit_cents: Option<i64>,
    pub cost_override_by_user: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Invoice> for ActiveModel {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: ActiveValue::Set(invoice.id.to_string()),
            user_id: ActiveValue::Set(invoice.user_id.clone()),
            customer_name: ActiveValue::Set(invoice.customer_name.clone()),
            revenue_cents: ActiveValue::Set(invoice.revenue_cents),
            total_actual_cost_cents: ActiveValue::Set(invoice.total_actual_cost_cents),
            actual_profit_cents: ActiveValue::Set(invoice.actual_profit_cents),
            cost_override_by_user: ActiveValue::Set(invoice.cost_override_by_user),
        }
    }
}

impl TryFrom<Model> for Invoice {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "invoice")?,
            user_id: model.user_id,
            customer_name: model.customer_name,
            revenue_cents: model.revenue_cents,
            total_actual_cost_cents: model.total_actual_cost_cents,
            actual_profit_cents: model.actual_profit_cents,
            cost_override_by_user: model.cost_override_by_user,
        })
    }
}
