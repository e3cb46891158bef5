use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use migration::MigratorTrait;
use server::{ServerState, router};

async fn app_with_db() -> (Router, DatabaseConnection) {
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

    let engine = engine::Engine::builder().database(db.clone()).build();
    let state = ServerState {
        engine: Arc::new(engine),
        db: db.clone(),
    };
    (router(state), db)
}

fn basic_auth() -> String {
    format!(
        "Basic {}",
        base64::prelude::BASE64_STANDARD.encode("alice:password")
    )
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seed_invoice(db: &DatabaseConnection, revenue_cents: i64) -> Uuid {
    let invoice = engine::Invoice::new("alice".to_string(), "Acme Co".to_string(), revenue_cents);
    engine::invoices::ActiveModel::from(&invoice)
        .insert(db)
        .await
        .unwrap();
    invoice.id
}

async fn seed_transaction(db: &DatabaseConnection, amount_cents: i64) -> Uuid {
    let tx = engine::BankTransaction::new(
        "alice".to_string(),
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

#[tokio::test]
async fn requests_without_credentials_are_unauthorized() {
    let (app, _db) = app_with_db().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/profit/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn link_then_profit_roundtrip() {
    let (app, db) = app_with_db().await;
    let invoice_id = seed_invoice(&db, 500_000).await;
    let tx_id = seed_transaction(&db, -120_000).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/allocation/link",
            serde_json::json!({
                "transaction_id": tx_id,
                "invoice_id": invoice_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["allocation"]["allocation_amount"], 120_000);
    assert_eq!(body["invoice_totals_updated"]["total_actual_cost"], 120_000);
    assert_eq!(body["invoice_totals_updated"]["actual_profit"], 380_000);

    let response = app
        .oneshot(post_json(
            "/profit",
            serde_json::json!({ "invoice_id": invoice_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["effective_cost"], 120_000);
    assert_eq!(body["cost_source"], "transactions");
    assert_eq!(body["profit"], 380_000);
}

#[tokio::test]
async fn the_legacy_job_id_spelling_still_works() {
    let (app, db) = app_with_db().await;
    let invoice_id = seed_invoice(&db, 500_000).await;
    let tx_id = seed_transaction(&db, -120_000).await;

    let response = app
        .oneshot(post_json(
            "/allocation/link",
            serde_json::json!({
                "transaction_id": tx_id,
                "job_id": invoice_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn over_allocation_returns_structured_detail() {
    let (app, db) = app_with_db().await;
    let invoice_a = seed_invoice(&db, 500_000).await;
    let invoice_b = seed_invoice(&db, 500_000).await;
    let tx_id = seed_transaction(&db, -100_000).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/allocation/link",
            serde_json::json!({
                "transaction_id": tx_id,
                "invoice_id": invoice_a,
                "allocation_amount": 70_000,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json(
            "/allocation/link",
            serde_json::json!({
                "transaction_id": tx_id,
                "invoice_id": invoice_b,
                "allocation_amount": 50_000,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    let detail = &body["over_allocation"];
    assert_eq!(detail["transaction_amount"], 100_000);
    assert_eq!(detail["allocated_amount"], 70_000);
    assert_eq!(detail["attempted_amount"], 50_000);
}

#[tokio::test]
async fn unlink_resets_totals_to_null() {
    let (app, db) = app_with_db().await;
    let invoice_id = seed_invoice(&db, 500_000).await;
    let tx_id = seed_transaction(&db, -120_000).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/allocation/link",
            serde_json::json!({
                "transaction_id": tx_id,
                "invoice_id": invoice_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json(
            "/allocation/unlink",
            serde_json::json!({
                "transaction_id": tx_id,
                "invoice_id": invoice_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["invoice_totals_updated"]["total_actual_cost"].is_null());
    assert!(body["invoice_totals_updated"]["actual_profit"].is_null());
}

#[tokio::test]
async fn purge_without_confirm_is_refused_with_a_report() {
    let (app, db) = app_with_db().await;
    seed_invoice(&db, 500_000).await;

    let response = app
        .clone()
        .oneshot(post_json("/invoices/purge", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["executed"], false);
    assert_eq!(body["invoice_count"], 1);
    assert_eq!(body["total_revenue"], 500_000);

    // The invoice is still there.
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/profit/summary")
                .header(header::AUTHORIZATION, basic_auth())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["invoice_count"], 1);
}
