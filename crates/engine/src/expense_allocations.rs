//! Transaction → blueprint-usage expense allocations.
//!
//! Splits part of a bank transaction onto one cost bucket of one usage.
//! `(blueprint_usage_id, transaction_id)` is an upsert key: re-linking the
//! same pair replaces the existing row instead of duplicating it.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// Which actual-cost bucket of the usage an expense allocation feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    Materials,
    Labor,
    Overhead,
}

impl ExpenseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Materials => "materials",
            Self::Labor => "labor",
            Self::Overhead => "overhead",
        }
    }
}

impl TryFrom<&str> for ExpenseType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "materials" => Ok(Self::Materials),
            "labor" => Ok(Self::Labor),
            "overhead" => Ok(Self::Overhead),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid expense type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseAllocation {
    pub id: Uuid,
    pub blueprint_usage_id: Uuid,
    pub transaction_id: Uuid,
    /// Integer cents, always positive.
    pub amount_cents: i64,
    pub expense_type: ExpenseType,
}

impl ExpenseAllocation {
    pub fn new(
        blueprint_usage_id: Uuid,
        transaction_id: Uuid,
        amount_cents: i64,
        expense_type: ExpenseType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            blueprint_usage_id,
            transaction_id,
            amount_cents,
            expense_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub blueprint_usage_id: String,
    pub transaction_id: String,
    pub amount_cents: i64,
    pub expense_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseAllocation> for ActiveModel {
    fn from(allocation: &ExpenseAllocation) -> Self {
        Self {
            id: ActiveValue::Set(allocation.id.to_string()),
            blueprint_usage_id: ActiveValue::Set(allocation.blueprint_usage_id.to_string()),
            transaction_id: ActiveValue::Set(allocation.transaction_id.to_string()),
            amount_cents: ActiveValue::Set(allocation.amount_cents),
            expense_type: ActiveValue::Set(allocation.expense_type.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for ExpenseAllocation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense allocation")?,
            blueprint_usage_id: parse_uuid(&model.blueprint_usage_id, "blueprint usage")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            amount_cents: model.amount_cents,
            expense_type: ExpenseType::try_from(model.expense_type.as_str())?,
        })
    }
}
