use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Statement,
};
use uuid::Uuid;

use engine::{
    AdjustInventoryCmd, Engine, EngineError, InventoryItem, MovementListFilter, MovementType,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

async fn seed_item(db: &DatabaseConnection, current_quantity: i64, minimum_quantity: i64) -> Uuid {
    let mut item = InventoryItem::new("alice".to_string(), "Resin".to_string(), current_quantity);
    item.minimum_quantity = minimum_quantity;
    engine::inventory_items::ActiveModel::from(&item)
        .insert(db)
        .await
        .unwrap();
    item.id
}

fn adjust_cmd(item_id: Uuid, movement_type: MovementType, delta: i64) -> AdjustInventoryCmd {
    AdjustInventoryCmd {
        user_id: "alice".to_string(),
        inventory_item_id: item_id,
        movement_type,
        quantity_change: delta,
        unit_cost_cents: None,
        reference_id: None,
        reference_type: None,
        notes: None,
    }
}

#[tokio::test]
async fn purchase_raises_stock_and_refreshes_unit_cost() {
    let (engine, db) = engine_with_db().await;
    let item_id = seed_item(&db, 5, 3).await;

    let outcome = engine
        .adjust_inventory(AdjustInventoryCmd {
            unit_cost_cents: Some(450),
            ..adjust_cmd(item_id, MovementType::Purchase, 20)
        })
        .await
        .unwrap();

    assert_eq!(outcome.status.quantity_before, 5);
    assert_eq!(outcome.status.quantity_after, 25);
    assert!(!outcome.status.is_low_stock);
    assert_eq!(outcome.movement.quantity_change, 20);
    assert_eq!(outcome.movement.unit_cost_cents, Some(450));

    let item = engine::inventory_items::Entity::find_by_id(item_id.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.current_quantity, 25);
    assert_eq!(item.unit_cost_cents, 450);
}

#[tokio::test]
async fn non_purchase_movements_leave_unit_cost_alone() {
    let (engine, db) = engine_with_db().await;
    let item_id = seed_item(&db, 10, 0).await;

    engine
        .adjust_inventory(AdjustInventoryCmd {
            unit_cost_cents: Some(999),
            ..adjust_cmd(item_id, MovementType::Waste, -2)
        })
        .await
        .unwrap();

    let item = engine::inventory_items::Entity::find_by_id(item_id.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.unit_cost_cents, 0);
    assert_eq!(item.current_quantity, 8);
}

#[tokio::test]
async fn stock_can_never_go_negative() {
    let (engine, db) = engine_with_db().await;
    let item_id = seed_item(&db, 20, 0).await;

    let err = engine
        .adjust_inventory(adjust_cmd(item_id, MovementType::Usage, -30))
        .await
        .unwrap_err();

    match err {
        EngineError::InsufficientInventory(shortages) => {
            assert_eq!(shortages.len(), 1);
            assert_eq!(shortages[0].current_quantity, 20);
            assert_eq!(shortages[0].required_quantity, 30);
            assert_eq!(shortages[0].shortage, 10);
        }
        other => panic!("expected InsufficientInventory, got {other:?}"),
    }

    // Rejected adjustments leave no trace.
    let item = engine::inventory_items::Entity::find_by_id(item_id.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.current_quantity, 20);
    let movements = engine::inventory_movements::Entity::find()
        .count(&db)
        .await
        .unwrap();
    assert_eq!(movements, 0);
}

#[tokio::test]
async fn zero_delta_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let item_id = seed_item(&db, 20, 0).await;

    let err = engine
        .adjust_inventory(adjust_cmd(item_id, MovementType::Adjustment, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn recompute_rebuilds_the_projection_from_the_log() {
    let (engine, db) = engine_with_db().await;
    let item_id = seed_item(&db, 0, 0).await;

    engine
        .adjust_inventory(adjust_cmd(item_id, MovementType::Purchase, 20))
        .await
        .unwrap();
    engine
        .adjust_inventory(adjust_cmd(item_id, MovementType::Usage, -5))
        .await
        .unwrap();
    assert_eq!(
        engine::inventory_items::Entity::find_by_id(item_id.to_string())
            .one(&db)
            .await
            .unwrap()
            .unwrap()
            .current_quantity,
        15
    );

    // Corrupt the cached projection directly in the DB.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE inventory_items SET current_quantity = ? WHERE id = ?",
        vec![999i64.into(), item_id.to_string().into()],
    ))
    .await
    .unwrap();

    let report = engine
        .recompute_inventory_quantities("alice", Some(item_id))
        .await
        .unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].quantity_before, 999);
    assert_eq!(report[0].quantity_after, 15);

    assert_eq!(
        engine::inventory_items::Entity::find_by_id(item_id.to_string())
            .one(&db)
            .await
            .unwrap()
            .unwrap()
            .current_quantity,
        15
    );
}

#[tokio::test]
async fn movement_listing_paginates_newest_first() {
    let (engine, db) = engine_with_db().await;
    let item_id = seed_item(&db, 0, 0).await;

    for delta in [10, 20, 30] {
        engine
            .adjust_inventory(adjust_cmd(item_id, MovementType::Purchase, delta))
            .await
            .unwrap();
    }

    let filter = MovementListFilter::default();
    let (page, cursor) = engine
        .list_inventory_movements("alice", item_id, 2, None, &filter)
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    let cursor = cursor.expect("a third movement remains");

    let (rest, cursor) = engine
        .list_inventory_movements("alice", item_id, 2, Some(&cursor), &filter)
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert!(cursor.is_none());

    // No overlap between pages.
    let seen: std::collections::HashSet<Uuid> =
        page.iter().chain(rest.iter()).map(|m| m.id).collect();
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn movement_listing_filters_by_type() {
    let (engine, db) = engine_with_db().await;
    let item_id = seed_item(&db, 10, 0).await;

    engine
        .adjust_inventory(adjust_cmd(item_id, MovementType::Purchase, 5))
        .await
        .unwrap();
    engine
        .adjust_inventory(adjust_cmd(item_id, MovementType::Waste, -1))
        .await
        .unwrap();

    let filter = MovementListFilter {
        movement_type: Some(MovementType::Waste),
    };
    let (page, _) = engine
        .list_inventory_movements("alice", item_id, 10, None, &filter)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].movement_type, MovementType::Waste);
}
