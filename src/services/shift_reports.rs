use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, EntityTrait, ModelTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{
    production_order::Entity as OrderEntity,
    shift_report::{ActiveModel as ReportActiveModel, Entity as ReportEntity},
    shift_report_row::{
        ActiveModel as RowActiveModel, Entity as RowEntity, Model as RowModel,
    },
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::reconciliation;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportRequest {
    pub report_date: NaiveDate,
    #[validate(length(min = 1, max = 32))]
    pub shift: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddRowRequest {
    /// Client-supplied row id, used as the idempotency key for retried
    /// creations. Generated server-side when absent.
    pub id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub machine_number: i32,
    #[validate(length(min = 1, max = 120, message = "Mold/product is required"))]
    pub mold_product: String,
    pub product_color: Option<String>,
    #[validate(range(min = 0, message = "Plan quantity must not be negative"))]
    pub plan_qty: i32,
    #[validate(range(min = 0, message = "Actual quantity must not be negative"))]
    pub actual_qty: i32,
    pub cycle_seconds: Option<i32>,
    pub downtime_minutes: Option<i32>,
    pub defect_qty: Option<i32>,
}

/// Post-creation edits are limited to fields outside the reconciliation
/// invariant. Editing `actual_qty` or `order_id` would have to reverse
/// the old delta and apply the new one as two steps in one transaction;
/// that path does not exist yet, so those fields are immutable here.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRowRequest {
    #[validate(length(min = 1, max = 120))]
    pub mold_product: Option<String>,
    pub product_color: Option<String>,
    #[validate(range(min = 0))]
    pub plan_qty: Option<i32>,
    pub cycle_seconds: Option<i32>,
    pub downtime_minutes: Option<i32>,
    pub defect_qty: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RowResponse {
    pub id: Uuid,
    pub report_id: Uuid,
    pub order_id: Option<Uuid>,
    pub machine_number: i32,
    pub mold_product: String,
    pub product_color: Option<String>,
    pub plan_qty: i32,
    pub actual_qty: i32,
    pub cycle_seconds: Option<i32>,
    pub downtime_minutes: Option<i32>,
    pub defect_qty: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Service owning shift reports and their rows. Row creation and
/// deletion are the two places a row's produced quantity flows into its
/// order's `completed_qty`; both run the row mutation and the counter
/// delta in one transaction.
#[derive(Clone)]
pub struct ShiftReportService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ShiftReportService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(report_date = %request.report_date, shift = %request.shift))]
    pub async fn create_report(&self, request: CreateReportRequest) -> Result<Uuid, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let report_id = Uuid::new_v4();

        ReportActiveModel {
            id: Set(report_id),
            report_date: Set(request.report_date),
            shift: Set(request.shift),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;

        info!(report_id = %report_id, "Shift report created");
        Ok(report_id)
    }

    /// Adds a row to a report. When the row links an order and carries a
    /// positive quantity, the order's counter is incremented in the same
    /// transaction. Retrying with the same row id returns the existing
    /// row without re-applying the delta.
    #[instrument(skip(self, request), fields(report_id = %report_id))]
    pub async fn add_row(
        &self,
        report_id: Uuid,
        request: AddRowRequest,
    ) -> Result<RowResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let row_id = request.id.unwrap_or_else(Uuid::new_v4);

        let txn = db.begin().await?;

        if request.id.is_some() {
            if let Some(existing) = RowEntity::find_by_id(row_id).one(&txn).await? {
                txn.commit().await?;
                info!(row_id = %row_id, "Row already exists; treating add as retried");
                return Ok(model_to_response(existing));
            }
        }

        ReportEntity::find_by_id(report_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Shift report {} not found", report_id)))?;

        if let Some(order_id) = request.order_id {
            OrderEntity::find_by_id(order_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        }

        let row = RowActiveModel {
            id: Set(row_id),
            report_id: Set(report_id),
            order_id: Set(request.order_id),
            machine_number: Set(request.machine_number),
            mold_product: Set(request.mold_product),
            product_color: Set(request.product_color),
            plan_qty: Set(request.plan_qty),
            actual_qty: Set(request.actual_qty),
            cycle_seconds: Set(request.cycle_seconds),
            downtime_minutes: Set(request.downtime_minutes),
            defect_qty: Set(request.defect_qty),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        if let Some(order_id) = row.order_id {
            reconciliation::apply_produced_delta(&txn, order_id, row.actual_qty).await?;
        }

        txn.commit().await?;

        info!(
            row_id = %row.id,
            order_id = ?row.order_id,
            actual_qty = row.actual_qty,
            "Report row added"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ReportRowAdded {
                    row_id: row.id,
                    order_id: row.order_id,
                    actual_qty: row.actual_qty,
                })
                .await
            {
                warn!(error = %e, row_id = %row.id, "Failed to send row added event");
            }
        }

        Ok(model_to_response(row))
    }

    /// Deletes a row, reversing its contribution to the linked order
    /// using the quantity stored on the row, never a caller-supplied
    /// value. A second delete of the same id is NotFound, which keeps
    /// retried deletes at-most-once.
    #[instrument(skip(self), fields(row_id = %row_id))]
    pub async fn delete_row(&self, row_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await?;

        let row = RowEntity::find_by_id(row_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Report row {} not found", row_id)))?;

        let order_id = row.order_id;
        let actual_qty = row.actual_qty;

        row.delete(&txn).await?;

        if let Some(order_id) = order_id {
            reconciliation::reverse_produced_delta(&txn, order_id, actual_qty).await?;
        }

        txn.commit().await?;

        info!(
            row_id = %row_id,
            order_id = ?order_id,
            actual_qty = actual_qty,
            "Report row deleted"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ReportRowDeleted {
                    row_id,
                    order_id,
                    actual_qty,
                })
                .await
            {
                warn!(error = %e, row_id = %row_id, "Failed to send row deleted event");
            }
        }

        Ok(())
    }

    /// Edits the non-reconciled fields of a row.
    #[instrument(skip(self, request), fields(row_id = %row_id))]
    pub async fn update_row(
        &self,
        row_id: Uuid,
        request: UpdateRowRequest,
    ) -> Result<RowResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let row = RowEntity::find_by_id(row_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Report row {} not found", row_id)))?;

        let mut active: RowActiveModel = row.into();
        if let Some(mold_product) = request.mold_product {
            active.mold_product = Set(mold_product);
        }
        if let Some(product_color) = request.product_color {
            active.product_color = Set(Some(product_color));
        }
        if let Some(plan_qty) = request.plan_qty {
            active.plan_qty = Set(plan_qty);
        }
        if let Some(cycle_seconds) = request.cycle_seconds {
            active.cycle_seconds = Set(Some(cycle_seconds));
        }
        if let Some(downtime_minutes) = request.downtime_minutes {
            active.downtime_minutes = Set(Some(downtime_minutes));
        }
        if let Some(defect_qty) = request.defect_qty {
            active.defect_qty = Set(Some(defect_qty));
        }
        let updated = active.update(db).await?;

        info!(row_id = %row_id, "Report row updated");
        Ok(model_to_response(updated))
    }

    pub async fn get_row(&self, row_id: Uuid) -> Result<RowResponse, ServiceError> {
        let db = &*self.db_pool;
        let row = RowEntity::find_by_id(row_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Report row {} not found", row_id)))?;
        Ok(model_to_response(row))
    }
}

fn model_to_response(model: RowModel) -> RowResponse {
    RowResponse {
        id: model.id,
        report_id: model.report_id,
        order_id: model.order_id,
        machine_number: model.machine_number,
        mold_product: model.mold_product,
        product_color: model.product_color,
        plan_qty: model.plan_qty,
        actual_qty: model.actual_qty,
        cycle_seconds: model.cycle_seconds,
        downtime_minutes: model.downtime_minutes,
        defect_qty: model.defect_qty,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_row_request_rejects_negative_quantities() {
        let request = AddRowRequest {
            id: None,
            order_id: None,
            machine_number: 3,
            mold_product: "Cup 200ml".into(),
            product_color: None,
            plan_qty: -1,
            actual_qty: 10,
            cycle_seconds: None,
            downtime_minutes: None,
            defect_qty: None,
        };
        assert!(request.validate().is_err());

        let request = AddRowRequest {
            plan_qty: 10,
            actual_qty: -5,
            ..request
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn add_row_request_requires_mold_product() {
        let request = AddRowRequest {
            id: None,
            order_id: None,
            machine_number: 3,
            mold_product: "".into(),
            product_color: None,
            plan_qty: 0,
            actual_qty: 0,
            cycle_seconds: None,
            downtime_minutes: None,
            defect_qty: None,
        };
        assert!(request.validate().is_err());
    }
}
