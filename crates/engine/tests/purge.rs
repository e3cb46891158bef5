use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Statement,
};
use uuid::Uuid;

use engine::{
    BankTransaction, CreateUsagesCmd, Engine, Invoice, LinkToInvoiceCmd, LinkToUsageCmd,
    UsageSpec,
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

struct Fixture {
    invoice_id: Uuid,
}

/// One invoice with every kind of dependent row hanging off it, plus an
/// inventory trail from the usage.
async fn seed_full_invoice(engine: &Engine, db: &DatabaseConnection) -> Fixture {
    let invoice = Invoice::new("alice".to_string(), "Acme Co".to_string(), 500_000);
    engine::invoices::ActiveModel::from(&invoice)
        .insert(db)
        .await
        .unwrap();

    engine::line_items::Model::active(invoice.id, "Labor", 200_000)
        .insert(db)
        .await
        .unwrap();
    engine::accounting_links::Model::active(invoice.id, "qb-1042")
        .insert(db)
        .await
        .unwrap();

    let tx = BankTransaction::new(
        "alice".to_string(),
        "Hardware Store".to_string(),
        -120_000,
        Utc::now(),
    );
    engine::transactions::ActiveModel::from(&tx)
        .insert(db)
        .await
        .unwrap();
    engine
        .link_transaction_to_invoice(LinkToInvoiceCmd {
            user_id: "alice".to_string(),
            transaction_id: tx.id,
            invoice_id: invoice.id,
            amount_cents: None,
            percentage: None,
            notes: None,
        })
        .await
        .unwrap();

    let blueprint = engine::Blueprint::new("alice".to_string(), "Cabinet".to_string());
    engine::blueprints::ActiveModel::from(&blueprint)
        .insert(db)
        .await
        .unwrap();
    let mut item = engine::InventoryItem::new("alice".to_string(), "Oak board".to_string(), 20);
    item.minimum_quantity = 0;
    engine::inventory_items::ActiveModel::from(&item)
        .insert(db)
        .await
        .unwrap();
    let requirement = engine::BlueprintItem::new(blueprint.id, item.id, 5);
    engine::blueprint_items::ActiveModel::from(&requirement)
        .insert(db)
        .await
        .unwrap();

    let outcome = engine
        .create_blueprint_usages(CreateUsagesCmd {
            user_id: "alice".to_string(),
            invoice_id: Some(invoice.id),
            usages: vec![UsageSpec {
                blueprint_id: Some(blueprint.id),
                actual_sale_price_cents: Some(80_000),
                ..Default::default()
            }],
            deduct_inventory: true,
        })
        .await
        .unwrap();

    engine
        .link_transaction_to_usage(LinkToUsageCmd {
            user_id: "alice".to_string(),
            transaction_id: tx.id,
            blueprint_usage_id: outcome.usages[0].id,
            expense_type: engine::ExpenseType::Materials,
            amount_cents: None,
        })
        .await
        .unwrap();

    Fixture {
        invoice_id: invoice.id,
    }
}

async fn count<E: EntityTrait>(db: &DatabaseConnection) -> u64 {
    E::find().count(db).await.unwrap()
}

#[tokio::test]
async fn purge_invoices_without_confirm_is_a_dry_run() {
    let (engine, db) = engine_with_db().await;
    seed_full_invoice(&engine, &db).await;

    let report = engine.purge_invoices("alice", false).await.unwrap();

    assert!(!report.executed);
    assert_eq!(report.invoice_count, 1);
    assert_eq!(report.allocation_count, 1);
    assert_eq!(report.usage_count, 1);
    assert_eq!(report.line_item_count, 1);
    assert_eq!(report.accounting_link_count, 1);
    assert_eq!(report.total_revenue_cents, 500_000);
    assert_eq!(report.total_cost_cents, 120_000);
    assert_eq!(report.total_profit_cents, 380_000);

    // Zero writes on a dry run.
    assert_eq!(count::<engine::invoices::Entity>(&db).await, 1);
    assert_eq!(count::<engine::allocations::Entity>(&db).await, 1);
    assert_eq!(count::<engine::blueprint_usages::Entity>(&db).await, 1);
    assert_eq!(count::<engine::line_items::Entity>(&db).await, 1);
    assert_eq!(count::<engine::accounting_links::Entity>(&db).await, 1);
}

#[tokio::test]
async fn confirmed_purge_deletes_dependents_and_reports_totals() {
    let (engine, db) = engine_with_db().await;
    seed_full_invoice(&engine, &db).await;

    let report = engine.purge_invoices("alice", true).await.unwrap();

    assert!(report.executed);
    assert_eq!(report.invoice_count, 1);
    assert_eq!(report.total_revenue_cents, 500_000);
    assert_eq!(report.total_cost_cents, 120_000);
    assert_eq!(report.total_profit_cents, 380_000);

    assert_eq!(count::<engine::invoices::Entity>(&db).await, 0);
    assert_eq!(count::<engine::allocations::Entity>(&db).await, 0);
    assert_eq!(count::<engine::blueprint_usages::Entity>(&db).await, 0);
    assert_eq!(count::<engine::expense_allocations::Entity>(&db).await, 0);
    assert_eq!(count::<engine::line_items::Entity>(&db).await, 0);
    assert_eq!(count::<engine::accounting_links::Entity>(&db).await, 0);

    // The audit log survives; its usage references are now historical.
    assert_eq!(count::<engine::inventory_movements::Entity>(&db).await, 1);
    // Bank transactions are never deleted by this engine.
    assert_eq!(count::<engine::transactions::Entity>(&db).await, 1);
}

#[tokio::test]
async fn purge_usages_spares_invoices_and_the_audit_log() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed_full_invoice(&engine, &db).await;

    let dry = engine.purge_blueprint_usages("alice", false).await.unwrap();
    assert!(!dry.executed);
    assert_eq!(dry.usage_count, 1);
    assert_eq!(dry.expense_allocation_count, 1);
    assert_eq!(dry.total_sale_price_cents, 80_000);
    assert_eq!(count::<engine::blueprint_usages::Entity>(&db).await, 1);

    let report = engine.purge_blueprint_usages("alice", true).await.unwrap();
    assert!(report.executed);
    assert_eq!(report.usage_count, 1);

    assert_eq!(count::<engine::blueprint_usages::Entity>(&db).await, 0);
    assert_eq!(count::<engine::expense_allocations::Entity>(&db).await, 0);
    // Invoices, allocations and the movement log are untouched.
    assert_eq!(count::<engine::invoices::Entity>(&db).await, 1);
    assert_eq!(count::<engine::allocations::Entity>(&db).await, 1);
    assert_eq!(count::<engine::inventory_movements::Entity>(&db).await, 1);

    let invoice = engine::invoices::Entity::find_by_id(fixture.invoice_id.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invoice.total_actual_cost_cents, Some(120_000));
}
