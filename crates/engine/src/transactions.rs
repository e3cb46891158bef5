//! Bank transaction records.
//!
//! Rows in this table are written by the external bank-sync collaborator and
//! are read-only for this engine: allocation ops reference them but never
//! change them. The sign of `amount_cents` is owned by the sync layer, so
//! every allocation bound works on the absolute amount.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: Uuid,
    pub user_id: String,
    /// Merchant / counterparty name from the aggregator.
    pub name: String,
    /// Signed integer cents.
    pub amount_cents: i64,
    pub posted_at: DateTime<Utc>,
    pub category: Option<String>,
    pub pending: bool,
}

impl BankTransaction {
    pub fn new(
        user_id: String,
        name: String,
        amount_cents: i64,
        posted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            amount_cents,
            posted_at,
            category: None,
            pending: false,
        }
    }

    /// The amount available for allocation, independent of sign convention.
    pub fn absolute_amount_cents(&self) -> i64 {
        self.amount_cents.abs()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub amount_cents: i64,
    pub posted_at: DateTimeUtc,
    pub category: Option<String>,
    pub pending: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankTransaction> for ActiveModel {
    fn from(tx: &BankTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            name: ActiveValue::Set(tx.name.clone()),
            amount_cents: ActiveValue::Set(tx.amount_cents),
            posted_at: ActiveValue::Set(tx.posted_at),
            category: ActiveValue::Set(tx.category.clone()),
            pending: ActiveValue::Set(tx.pending),
        }
    }
}

impl TryFrom<Model> for BankTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: model.user_id,
            name: model.name,
            amount_cents: model.amount_cents,
            posted_at: model.posted_at,
            category: model.category,
            pending: model.pending,
        })
    }
}
