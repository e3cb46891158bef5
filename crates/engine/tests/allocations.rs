use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Statement,
};
use uuid::Uuid;

use engine::{
    AllocationRef, BankTransaction, Engine, EngineError, ExpenseType, Invoice, LinkToInvoiceCmd,
    LinkToUsageCmd, UnlinkFromInvoiceCmd, UnlinkFromUsageCmd, UsageSpec,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

async fn seed_transaction(db: &DatabaseConnection, user: &str, amount_cents: i64) -> Uuid {
    let tx = BankTransaction::new(
        user.to_string(),
        "Hardware Store".to_string(),
        amount_cents,
        Utc::now(),
    );
    engine::transactions::ActiveModel::from(&tx)
        .insert(db)
        .await
        .unwrap();
    tx.id
}

async fn seed_invoice(db: &DatabaseConnection, user: &str, revenue_cents: i64) -> Uuid {
    let invoice = Invoice::new(user.to_string(), "Acme Co".to_string(), revenue_cents);
    engine::invoices::ActiveModel::from(&invoice)
        .insert(db)
        .await
        .unwrap();
    invoice.id
}

async fn seed_blueprint(db: &DatabaseConnection, user: &str) -> Uuid {
    let blueprint = engine::Blueprint::new(user.to_string(), "Standard build".to_string());
    engine::blueprints::ActiveModel::from(&blueprint)
        .insert(db)
        .await
        .unwrap();
    blueprint.id
}

fn link_cmd(transaction_id: Uuid, invoice_id: Uuid) -> LinkToInvoiceCmd {
    LinkToInvoiceCmd {
        user_id: "alice".to_string(),
        transaction_id,
        invoice_id,
        amount_cents: None,
        percentage: None,
        notes: None,
    }
}

#[tokio::test]
async fn link_full_then_percentage_then_unlink() {
    let (engine, db) = engine_with_db().await;
    let invoice_id = seed_invoice(&db, "alice", 500_000).await;
    let tx_a = seed_transaction(&db, "alice", -120_000).await;
    let tx_b = seed_transaction(&db, "alice", -30_000).await;

    // Full allocation of A: cost 1200.00 against revenue 5000.00.
    let outcome = engine
        .link_transaction_to_invoice(link_cmd(tx_a, invoice_id))
        .await
        .unwrap();
    assert_eq!(outcome.allocation.amount_cents, 120_000);
    assert_eq!(
        outcome.invoice_totals.total_actual_cost_cents,
        Some(120_000)
    );
    assert_eq!(outcome.invoice_totals.actual_profit_cents, Some(380_000));

    // 50% of B adds 150.00.
    let outcome = engine
        .link_transaction_to_invoice(LinkToInvoiceCmd {
            percentage: Some(50.0),
            ..link_cmd(tx_b, invoice_id)
        })
        .await
        .unwrap();
    assert_eq!(outcome.allocation.amount_cents, 15_000);
    assert_eq!(
        outcome.invoice_totals.total_actual_cost_cents,
        Some(135_000)
    );
    assert_eq!(outcome.invoice_totals.actual_profit_cents, Some(365_000));

    // Unlinking A leaves only B's share.
    let totals = engine
        .unlink_transaction_from_invoice(UnlinkFromInvoiceCmd {
            user_id: "alice".to_string(),
            selector: AllocationRef::ByPair {
                transaction_id: tx_a,
                invoice_id,
            },
        })
        .await
        .unwrap();
    assert_eq!(totals.total_actual_cost_cents, Some(15_000));
    assert_eq!(totals.actual_profit_cents, Some(485_000));
}

#[tokio::test]
async fn over_allocation_across_invoices_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let invoice_a = seed_invoice(&db, "alice", 200_000).await;
    let invoice_b = seed_invoice(&db, "alice", 200_000).await;
    let tx = seed_transaction(&db, "alice", 100_000).await;

    engine
        .link_transaction_to_invoice(LinkToInvoiceCmd {
            amount_cents: Some(60_000),
            ..link_cmd(tx, invoice_a)
        })
        .await
        .unwrap();

    let err = engine
        .link_transaction_to_invoice(LinkToInvoiceCmd {
            amount_cents: Some(50_000),
            ..link_cmd(tx, invoice_b)
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::OverAllocation {
            transaction_id: tx,
            transaction_cents: 100_000,
            allocated_cents: 60_000,
            attempted_cents: 50_000,
        }
    );

    // The rejected link must leave the second invoice untouched.
    let invoice = engine::invoices::Entity::find_by_id(invoice_b.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invoice.total_actual_cost_cents, None);
}

#[tokio::test]
async fn one_cent_of_rounding_is_tolerated() {
    let (engine, db) = engine_with_db().await;
    let invoice_a = seed_invoice(&db, "alice", 100_000).await;
    let invoice_b = seed_invoice(&db, "alice", 100_000).await;
    // 33.333…% splits of 10.01 round to 334 cents each; three of them
    // overshoot the 1001 total by 1 cent, which must pass.
    let tx = seed_transaction(&db, "alice", -1001).await;

    engine
        .link_transaction_to_invoice(LinkToInvoiceCmd {
            amount_cents: Some(334),
            ..link_cmd(tx, invoice_a)
        })
        .await
        .unwrap();
    engine
        .link_transaction_to_invoice(LinkToInvoiceCmd {
            amount_cents: Some(668),
            ..link_cmd(tx, invoice_b)
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn relinking_the_same_pair_updates_in_place() {
    let (engine, db) = engine_with_db().await;
    let invoice_id = seed_invoice(&db, "alice", 300_000).await;
    let tx = seed_transaction(&db, "alice", -80_000).await;

    let first = engine
        .link_transaction_to_invoice(link_cmd(tx, invoice_id))
        .await
        .unwrap();
    let second = engine
        .link_transaction_to_invoice(link_cmd(tx, invoice_id))
        .await
        .unwrap();

    assert_eq!(first.allocation.id, second.allocation.id);
    assert_eq!(
        second.invoice_totals.total_actual_cost_cents,
        Some(80_000)
    );

    let count = engine::allocations::Entity::find()
        .filter(engine::allocations::Column::TransactionId.eq(tx.to_string()))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn unlinking_the_last_allocation_resets_totals_to_unknown() {
    let (engine, db) = engine_with_db().await;
    let invoice_id = seed_invoice(&db, "alice", 300_000).await;
    let tx = seed_transaction(&db, "alice", -80_000).await;

    let outcome = engine
        .link_transaction_to_invoice(link_cmd(tx, invoice_id))
        .await
        .unwrap();

    let totals = engine
        .unlink_transaction_from_invoice(UnlinkFromInvoiceCmd {
            user_id: "alice".to_string(),
            selector: AllocationRef::ById(outcome.allocation.id),
        })
        .await
        .unwrap();
    // Null, not zero: "no cost data" is not "known zero cost".
    assert_eq!(totals.total_actual_cost_cents, None);
    assert_eq!(totals.actual_profit_cents, None);
}

#[tokio::test]
async fn amount_and_percentage_together_are_rejected() {
    let (engine, db) = engine_with_db().await;
    let invoice_id = seed_invoice(&db, "alice", 300_000).await;
    let tx = seed_transaction(&db, "alice", -80_000).await;

    let err = engine
        .link_transaction_to_invoice(LinkToInvoiceCmd {
            amount_cents: Some(40_000),
            percentage: Some(50.0),
            ..link_cmd(tx, invoice_id)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn foreign_rows_are_invisible() {
    let (engine, db) = engine_with_db().await;
    let invoice_id = seed_invoice(&db, "bob", 300_000).await;
    let tx = seed_transaction(&db, "alice", -80_000).await;

    let err = engine
        .link_transaction_to_invoice(link_cmd(tx, invoice_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn unlinking_a_missing_allocation_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .unlink_transaction_from_invoice(UnlinkFromInvoiceCmd {
            user_id: "alice".to_string(),
            selector: AllocationRef::ById(Uuid::new_v4()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn expense_links_recompute_usage_buckets() {
    let (engine, db) = engine_with_db().await;
    let blueprint_id = seed_blueprint(&db, "alice").await;
    let tx_a = seed_transaction(&db, "alice", -10_000).await;
    let tx_b = seed_transaction(&db, "alice", -4_000).await;

    let outcome = engine
        .create_blueprint_usages(engine::CreateUsagesCmd {
            user_id: "alice".to_string(),
            invoice_id: None,
            usages: vec![UsageSpec {
                blueprint_id: Some(blueprint_id),
                actual_sale_price_cents: Some(30_000),
                ..Default::default()
            }],
            deduct_inventory: false,
        })
        .await
        .unwrap();
    let usage_id = outcome.usages[0].id;

    // Materials from A, labor from B.
    let link = engine
        .link_transaction_to_usage(LinkToUsageCmd {
            user_id: "alice".to_string(),
            transaction_id: tx_a,
            blueprint_usage_id: usage_id,
            expense_type: ExpenseType::Materials,
            amount_cents: Some(5_000),
        })
        .await
        .unwrap();
    assert_eq!(link.usage.actual_materials_cost_cents, 5_000);

    let link = engine
        .link_transaction_to_usage(LinkToUsageCmd {
            user_id: "alice".to_string(),
            transaction_id: tx_b,
            blueprint_usage_id: usage_id,
            expense_type: ExpenseType::Labor,
            amount_cents: Some(3_000),
        })
        .await
        .unwrap();
    assert_eq!(link.usage.actual_materials_cost_cents, 5_000);
    assert_eq!(link.usage.actual_labor_cost_cents, 3_000);

    // Re-linking A replaces its row and amount.
    let link = engine
        .link_transaction_to_usage(LinkToUsageCmd {
            user_id: "alice".to_string(),
            transaction_id: tx_a,
            blueprint_usage_id: usage_id,
            expense_type: ExpenseType::Materials,
            amount_cents: Some(7_000),
        })
        .await
        .unwrap();
    assert_eq!(link.usage.actual_materials_cost_cents, 7_000);

    let count = engine::expense_allocations::Entity::find()
        .filter(
            engine::expense_allocations::Column::BlueprintUsageId.eq(usage_id.to_string()),
        )
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 2);

    // Unlinking B zeroes the labor bucket.
    let usage = engine
        .unlink_transaction_from_usage(UnlinkFromUsageCmd {
            user_id: "alice".to_string(),
            selector: engine::ExpenseAllocationRef::ByPair {
                transaction_id: tx_b,
                blueprint_usage_id: usage_id,
            },
        })
        .await
        .unwrap();
    assert_eq!(usage.actual_materials_cost_cents, 7_000);
    assert_eq!(usage.actual_labor_cost_cents, 0);
}
