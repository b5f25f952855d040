//! End-to-end flow over a real database: order lifecycle, shift-report
//! rows driving the order counter, machine synchronization, and recipe
//! driven material requests.
//!
//! Ignored by default because it needs SQLite with migrations.
//! Run with: cargo test -- --ignored reconciliation_flow

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use shopfloor_api::{
    config::AppConfig,
    db,
    errors::ServiceError,
    events::{process_events, EventSender},
    handlers::AppServices,
    services::{
        machines::MachineStatus,
        orders::{CreateOrderRequest, OrderStatus},
        recipes::{CreateRecipeComponent, CreateRecipeRequest},
        shift_reports::{AddRowRequest, CreateReportRequest},
    },
};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

async fn setup_services() -> AppServices {
    let cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        18080,
        "test".to_string(),
    );
    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");

    let (tx, rx) = mpsc::channel(100);
    let sender = EventSender::new(tx);
    tokio::spawn(process_events(rx));

    AppServices::new(Arc::new(pool), Arc::new(sender))
}

fn row(order_id: Option<Uuid>, actual_qty: i32) -> AddRowRequest {
    AddRowRequest {
        id: None,
        order_id,
        machine_number: 3,
        mold_product: "Cup 200ml".into(),
        product_color: Some("white".into()),
        plan_qty: 200,
        actual_qty,
        cycle_seconds: Some(12),
        downtime_minutes: None,
        defect_qty: None,
    }
}

#[tokio::test]
#[ignore]
async fn reconciliation_flow() {
    let services = setup_services().await;

    let machine = services
        .machines
        .create_machine(3, "Injection press 3".into())
        .await
        .expect("create machine");
    assert_eq!(machine.status, MachineStatus::Idle);

    // Recipe registered before the order so auto-generation can match it.
    services
        .recipes
        .create_recipe(CreateRecipeRequest {
            name: "Cup 200ml standard".into(),
            product: "Cup 200ml".into(),
            components: vec![
                CreateRecipeComponent {
                    material_name: "PP granulate".into(),
                    percentage: dec!(60),
                    weight_kg: None,
                },
                CreateRecipeComponent {
                    material_name: "Masterbatch white".into(),
                    percentage: dec!(40),
                    weight_kg: None,
                },
            ],
        })
        .await
        .expect("create recipe");

    let order = services
        .orders
        .create_order(CreateOrderRequest {
            machine_id: machine.id,
            product: "Cup 200ml".into(),
            quantity: 1000,
            color: Some("white".into()),
            mold_name: Some("M-204".into()),
            notes: None,
        })
        .await
        .expect("create order");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.completed_qty, 0);
    assert_eq!(order.remaining_qty, 1000);

    // The order got a material request with verbatim percentages and no
    // kilogram figures yet.
    let request = services
        .material_requests
        .get_by_order(order.id)
        .await
        .expect("lookup request")
        .expect("request should have been auto-generated");
    assert_eq!(request.items.len(), 2);
    assert!(request.items.iter().all(|item| item.calculated_kg.is_none()));
    // Items keep the recipe's component order
    assert_eq!(request.items[0].material_name, "PP granulate");
    assert_eq!(request.items[0].percentage, dec!(60));
    assert_eq!(request.items[1].material_name, "Masterbatch white");
    assert_eq!(request.items[1].percentage, dec!(40));

    // Starting the order marks the machine running.
    let order = services
        .orders
        .update_status(order.id, OrderStatus::InProgress)
        .await
        .expect("start order");
    assert_eq!(order.status, OrderStatus::InProgress);
    let machine_now = services
        .machines
        .get_machine(machine.id)
        .await
        .expect("get machine");
    assert_eq!(machine_now.status, MachineStatus::Running);

    // Two rows feed the counter; deleting one reverses its share.
    let report_id = services
        .shift_reports
        .create_report(CreateReportRequest {
            report_date: NaiveDate::from_ymd_opt(2026, 8, 27).unwrap(),
            shift: "day".into(),
            notes: None,
        })
        .await
        .expect("create report");

    let first = services
        .shift_reports
        .add_row(report_id, row(Some(order.id), 150))
        .await
        .expect("add first row");
    services
        .shift_reports
        .add_row(report_id, row(Some(order.id), 100))
        .await
        .expect("add second row");

    let order_now = services.orders.get_order(order.id).await.expect("get order");
    assert_eq!(order_now.completed_qty, 250);
    assert_eq!(order_now.remaining_qty, 750);

    services
        .shift_reports
        .delete_row(first.id)
        .await
        .expect("delete first row");
    let order_now = services.orders.get_order(order.id).await.expect("get order");
    assert_eq!(order_now.completed_qty, 100);

    // A second delete of the same row must not re-apply the reversal.
    let double_delete = services.shift_reports.delete_row(first.id).await;
    assert!(matches!(double_delete, Err(ServiceError::NotFound(_))));
    let order_now = services.orders.get_order(order.id).await.expect("get order");
    assert_eq!(order_now.completed_qty, 100);

    // Counter agrees with the rows, so the sweep repairs nothing.
    let drift = services.orders.reconcile(order.id).await.expect("reconcile");
    assert!(!drift.repaired);
    assert_eq!(drift.computed, 100);

    // Base weight turns percentages into kilograms: 60/40 of 25 kg.
    let detail = services
        .material_requests
        .recalculate(request.request.id, dec!(25))
        .await
        .expect("recalculate");
    assert_eq!(detail.items[0].material_name, "PP granulate");
    assert_eq!(detail.items[1].material_name, "Masterbatch white");
    let kgs: Vec<_> = detail
        .items
        .iter()
        .map(|item| item.calculated_kg.expect("kg should be set"))
        .collect();
    assert_eq!(kgs, vec![dec!(15.000), dec!(10.000)]);

    // Recalculating with the same weight changes nothing.
    let again = services
        .material_requests
        .recalculate(request.request.id, dec!(25))
        .await
        .expect("recalculate again");
    let kgs_again: Vec<_> = again
        .items
        .iter()
        .map(|item| item.calculated_kg.expect("kg should be set"))
        .collect();
    assert_eq!(kgs, kgs_again);

    // Finishing the order idles the machine; the terminal status is final.
    let order_done = services
        .orders
        .update_status(order.id, OrderStatus::Completed)
        .await
        .expect("complete order");
    assert_eq!(order_done.status, OrderStatus::Completed);
    let machine_now = services
        .machines
        .get_machine(machine.id)
        .await
        .expect("get machine");
    assert_eq!(machine_now.status, MachineStatus::Idle);

    let reopen = services
        .orders
        .update_status(order.id, OrderStatus::InProgress)
        .await;
    assert!(matches!(reopen, Err(ServiceError::InvalidOperation(_))));
}

#[tokio::test]
#[ignore]
async fn sweep_repairs_a_drifted_counter() {
    let services = setup_services().await;

    let machine = services
        .machines
        .create_machine(5, "Injection press 5".into())
        .await
        .expect("create machine");
    let order = services
        .orders
        .create_order(CreateOrderRequest {
            machine_id: machine.id,
            product: "Lid 200ml".into(),
            quantity: 500,
            color: None,
            mold_name: None,
            notes: None,
        })
        .await
        .expect("create order");

    let report_id = services
        .shift_reports
        .create_report(CreateReportRequest {
            report_date: NaiveDate::from_ymd_opt(2026, 8, 27).unwrap(),
            shift: "night".into(),
            notes: None,
        })
        .await
        .expect("create report");
    services
        .shift_reports
        .add_row(report_id, row(Some(order.id), 80))
        .await
        .expect("add row");

    // Counter matches the rows, so nothing to repair.
    let repaired = services.orders.reconcile_all().await.expect("sweep");
    assert!(repaired.is_empty());

    let drift = services.orders.reconcile(order.id).await.expect("reconcile");
    assert!(!drift.repaired);
    assert_eq!(drift.stored, 80);
    assert_eq!(drift.computed, 80);
}
