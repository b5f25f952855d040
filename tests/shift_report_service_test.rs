//! Unit tests for ShiftReportService error and idempotency paths.
//!
//! The happy path, including counter reconciliation against a real
//! database, lives in `order_reconciliation_flow_test.rs`.

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase};
use shopfloor_api::{
    entities::{shift_report, shift_report_row},
    errors::ServiceError,
    services::shift_reports::{AddRowRequest, ShiftReportService},
};
use std::sync::Arc;
use uuid::Uuid;

fn sample_row_request(actual_qty: i32) -> AddRowRequest {
    AddRowRequest {
        id: None,
        order_id: None,
        machine_number: 3,
        mold_product: "Cup 200ml".into(),
        product_color: Some("white".into()),
        plan_qty: 200,
        actual_qty,
        cycle_seconds: Some(12),
        downtime_minutes: None,
        defect_qty: Some(2),
    }
}

fn sample_row_model(id: Uuid, report_id: Uuid) -> shift_report_row::Model {
    shift_report_row::Model {
        id,
        report_id,
        order_id: None,
        machine_number: 3,
        mold_product: "Cup 200ml".into(),
        product_color: None,
        plan_qty: 200,
        actual_qty: 150,
        cycle_seconds: None,
        downtime_minutes: None,
        defect_qty: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn add_row_rejects_negative_actual_qty_before_touching_the_db() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let service = ShiftReportService::new(Arc::new(db), None);

    let result = service
        .add_row(Uuid::new_v4(), sample_row_request(-1))
        .await;

    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[tokio::test]
async fn add_row_to_missing_report_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<shift_report::Model>::new()])
        .into_connection();
    let service = ShiftReportService::new(Arc::new(db), None);

    let result = service
        .add_row(Uuid::new_v4(), sample_row_request(150))
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn retried_add_with_same_row_id_returns_existing_row() {
    let report_id = Uuid::new_v4();
    let row_id = Uuid::new_v4();
    let existing = sample_row_model(row_id, report_id);

    // The retry lookup finds the row; nothing is inserted and no counter
    // delta is applied.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![existing]])
        .into_connection();
    let service = ShiftReportService::new(Arc::new(db), None);

    let request = AddRowRequest {
        id: Some(row_id),
        ..sample_row_request(150)
    };
    let row = service
        .add_row(report_id, request)
        .await
        .expect("retried add should succeed");

    assert_eq!(row.id, row_id);
    assert_eq!(row.actual_qty, 150);
}

#[tokio::test]
async fn delete_of_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<shift_report_row::Model>::new()])
        .into_connection();
    let service = ShiftReportService::new(Arc::new(db), None);

    let result = service.delete_row(Uuid::new_v4()).await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<shift_report_row::Model>::new()])
        .into_connection();
    let service = ShiftReportService::new(Arc::new(db), None);

    let result = service
        .update_row(
            Uuid::new_v4(),
            shopfloor_api::services::shift_reports::UpdateRowRequest {
                mold_product: Some("Lid 200ml".into()),
                product_color: None,
                plan_qty: None,
                cycle_seconds: None,
                downtime_minutes: None,
                defect_qty: None,
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
