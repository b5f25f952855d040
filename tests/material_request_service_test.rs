//! Unit tests for MaterialRequestService edge paths.
//!
//! Recalculation against a real database, including the auto-generation
//! on order creation, lives in `order_reconciliation_flow_test.rs`.

use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase};
use shopfloor_api::{
    entities::{material_request, recipe},
    errors::ServiceError,
    services::{material_requests::MaterialRequestService, recipes::RecipeService},
};
use std::sync::Arc;
use uuid::Uuid;

fn service_over(db: sea_orm::DatabaseConnection) -> MaterialRequestService {
    let db = Arc::new(db);
    let recipes = Arc::new(RecipeService::new(db.clone()));
    MaterialRequestService::new(db, None, recipes)
}

#[tokio::test]
async fn recalculate_rejects_negative_base_weight() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let service = service_over(db);

    let result = service.recalculate(Uuid::new_v4(), dec!(-1)).await;

    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[tokio::test]
async fn recalculate_of_missing_request_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<material_request::Model>::new()])
        .into_connection();
    let service = service_over(db);

    let result = service.recalculate(Uuid::new_v4(), dec!(25)).await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn order_without_matching_recipe_generates_nothing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<recipe::Model>::new()])
        .into_connection();
    let service = service_over(db);

    let generated = service
        .on_order_created(Uuid::new_v4(), "Unknown product")
        .await
        .expect("missing recipe is a no-op, not an error");

    assert_eq!(generated, None);
}

#[tokio::test]
async fn get_by_order_without_request_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<material_request::Model>::new()])
        .into_connection();
    let service = service_over(db);

    let detail = service
        .get_by_order(Uuid::new_v4())
        .await
        .expect("lookup should succeed");

    assert!(detail.is_none());
}
