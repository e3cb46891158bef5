//! Invoice line items. Owned by the CRUD surface; the engine only deletes
//! them (before their invoice) during a purge.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invoice_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub invoice_id: String,
    pub description: String,
    pub amount_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn active(invoice_id: Uuid, description: &str, amount_cents: i64) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            invoice_id: ActiveValue::Set(invoice_id.to_string()),
            description: ActiveValue::Set(description.to_string()),
            amount_cents: ActiveValue::Set(amount_cents),
        }
    }
}
