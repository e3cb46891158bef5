use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, blueprint_usages, util::parse_uuid};

use super::Engine;

/// Generates a `require_*` lookup for a caller-scoped entity.
///
/// Rows owned by another user are reported as missing, never as forbidden,
/// so ids cannot be probed across accounts.
macro_rules! impl_require_owned {
    ($fn_name:ident, $module:ident, $label:literal) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<crate::$module::Model> {
            crate::$module::Entity::find_by_id(id.to_string())
                .filter(crate::$module::Column::UserId.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!(concat!($label, " {}"), id)))
        }
    };
}

impl Engine {
    impl_require_owned!(require_transaction, transactions, "transaction");
    impl_require_owned!(require_invoice, invoices, "invoice");
    impl_require_owned!(require_blueprint, blueprints, "blueprint");
    impl_require_owned!(require_inventory_item, inventory_items, "inventory item");

    /// A blueprint usage has no owner column; ownership flows through its
    /// blueprint.
    pub(super) async fn require_blueprint_usage(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
        user_id: &str,
    ) -> ResultEngine<blueprint_usages::Model> {
        let model = blueprint_usages::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("blueprint usage {id}")))?;
        let blueprint_id = parse_uuid(&model.blueprint_id, "blueprint")?;
        self.require_blueprint(db, blueprint_id, user_id).await?;
        Ok(model)
    }
}
