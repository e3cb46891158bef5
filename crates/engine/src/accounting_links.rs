//! Mapping rows between invoices and the external accounting software.
//! Owned by the sync collaborator; the engine only deletes them (before
//! their invoice) during a purge.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounting_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub invoice_id: String,
    pub remote_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn active(invoice_id: Uuid, remote_id: &str) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            invoice_id: ActiveValue::Set(invoice_id.to_string()),
            remote_id: ActiveValue::Set(remote_id.to_string()),
        }
    }
}
