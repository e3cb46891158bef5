//! Transaction → invoice allocations.
//!
//! An allocation splits part of a bank transaction's amount onto one
//! invoice; one transaction may be split across several invoices. The
//! invariant guarded by the allocation ops: the sum of `amount_cents` across
//! all allocations of one transaction never exceeds the transaction's
//! absolute amount (plus a 1 cent rounding tolerance).
//!
//! `(transaction_id, invoice_id)` is an upsert key: re-linking the same pair
//! replaces the existing row.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub invoice_id: Uuid,
    /// Integer cents, always positive.
    pub amount_cents: i64,
    /// Present when the split was requested as a percentage.
    pub percentage: Option<f64>,
    pub notes: Option<String>,
}

impl Allocation {
    pub fn new(transaction_id: Uuid, invoice_id: Uuid, amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id,
            invoice_id,
            amount_cents,
            percentage: None,
            notes: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub invoice_id: String,
    pub amount_cents: i64,
    pub percentage: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Allocation> for ActiveModel {
    fn from(allocation: &Allocation) -> Self {
        Self {
            id: ActiveValue::Set(allocation.id.to_string()),
            transaction_id: ActiveValue::Set(allocation.transaction_id.to_string()),
            invoice_id: ActiveValue::Set(allocation.invoice_id.to_string()),
            amount_cents: ActiveValue::Set(allocation.amount_cents),
            percentage: ActiveValue::Set(allocation.percentage),
            notes: ActiveValue::Set(allocation.notes.clone()),
        }
    }
}

impl TryFrom<Model> for Allocation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "allocation")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            invoice_id: parse_uuid(&model.invoice_id, "invoice")?,
            amount_cents: model.amount_cents,
            percentage: model.percentage,
            notes: model.notes,
        })
    }
}
