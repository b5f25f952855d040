//! Unit tests for OrderService validation and lookup failures.

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use std::collections::BTreeMap;
use shopfloor_api::{
    entities::{machine, production_order},
    errors::ServiceError,
    services::orders::{CreateOrderRequest, OrderService, OrderStatus},
};
use std::sync::Arc;
use uuid::Uuid;

fn service_over(db: sea_orm::DatabaseConnection) -> OrderService {
    OrderService::new(Arc::new(db), None, None)
}

fn sample_order_request(machine_id: Uuid, quantity: i32) -> CreateOrderRequest {
    CreateOrderRequest {
        machine_id,
        product: "Cup 200ml".into(),
        quantity,
        color: Some("white".into()),
        mold_name: None,
        notes: None,
    }
}

fn stored_order(id: Uuid, status: &str) -> production_order::Model {
    let now = Utc::now();
    production_order::Model {
        id,
        machine_id: Uuid::new_v4(),
        product: "Cup 200ml".into(),
        quantity: 1000,
        completed_qty: 0,
        status: status.into(),
        color: None,
        mold_name: None,
        notes: None,
        created_at: now,
        updated_at: Some(now),
        version: 1,
    }
}

#[tokio::test]
async fn create_order_rejects_zero_quantity() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let service = service_over(db);

    let result = service
        .create_order(sample_order_request(Uuid::new_v4(), 0))
        .await;

    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[tokio::test]
async fn create_order_against_missing_machine_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<machine::Model>::new()])
        .into_connection();
    let service = service_over(db);

    let result = service
        .create_order(sample_order_request(Uuid::new_v4(), 1000))
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn status_update_of_missing_order_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<production_order::Model>::new()])
        .into_connection();
    let service = service_over(db);

    let result = service
        .update_status(Uuid::new_v4(), OrderStatus::InProgress)
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn reopening_a_completed_order_is_rejected() {
    let order_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored_order(order_id, "completed")]])
        .into_connection();
    let service = service_over(db);

    let result = service
        .update_status(order_id, OrderStatus::InProgress)
        .await;

    assert!(matches!(result, Err(ServiceError::InvalidOperation(_))));
}

#[tokio::test]
async fn reconcile_rejects_a_row_sum_beyond_the_counter_range() {
    let order_id = Uuid::new_v4();
    let oversized_sum =
        BTreeMap::from([("total", Value::BigInt(Some(i64::from(i32::MAX) + 1)))]);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored_order(order_id, "in_progress")]])
        .append_query_results([vec![oversized_sum]])
        .into_connection();
    let service = service_over(db);

    let result = service.reconcile(order_id).await;

    assert!(matches!(result, Err(ServiceError::InternalError(_))));
}

#[tokio::test]
async fn get_of_missing_order_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<production_order::Model>::new()])
        .into_connection();
    let service = service_over(db);

    let result = service.get_order(Uuid::new_v4()).await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
