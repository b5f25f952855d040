use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{
    machine::Entity as MachineEntity,
    production_order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
    },
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::material_requests::MaterialRequestService;
use crate::services::reconciliation::{self, CompletedQtyDrift};

/// Lifecycle status of a production order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Legal transitions. Completed and cancelled are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::InProgress)
                | (OrderStatus::Pending, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::InProgress, OrderStatus::Completed)
                | (OrderStatus::InProgress, OrderStatus::Cancelled)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub machine_id: Uuid,
    #[validate(length(min = 1, max = 120, message = "Product name is required"))]
    pub product: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub color: Option<String>,
    pub mold_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub machine_id: Uuid,
    pub product: String,
    pub quantity: i32,
    pub completed_qty: i32,
    pub remaining_qty: i32,
    pub status: OrderStatus,
    pub color: Option<String>,
    pub mold_name: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

/// Service owning production orders and their derived completed
/// quantity. The counter itself is only mutated by the reconciliation
/// module; this service exposes reads, creation, the status state
/// machine and the repair sweep.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    material_requests: Option<Arc<MaterialRequestService>>,
}

impl OrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        material_requests: Option<Arc<MaterialRequestService>>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            material_requests,
        }
    }

    /// Creates a new order with `completed_qty = 0` and `status =
    /// pending`. Placing an order has no effect on machine status; only
    /// the transition into `in_progress` does.
    ///
    /// After the order commits, a material request is auto-generated when
    /// a recipe matches the product. Generation failure never fails the
    /// order; the request can be created later by hand.
    #[instrument(skip(self, request), fields(machine_id = %request.machine_id, product = %request.product))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = db.begin().await?;

        MachineEntity::find_by_id(request.machine_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Machine {} not found", request.machine_id))
            })?;

        let order = OrderActiveModel {
            id: Set(order_id),
            machine_id: Set(request.machine_id),
            product: Set(request.product.clone()),
            quantity: Set(request.quantity),
            completed_qty: Set(0),
            status: Set(OrderStatus::Pending.to_string()),
            color: Set(request.color),
            mold_name: Set(request.mold_name),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(order_id = %order_id, "Order created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderCreated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "Failed to send order created event");
            }
        }

        if let Some(material_requests) = &self.material_requests {
            if let Err(e) = material_requests
                .on_order_created(order_id, &request.product)
                .await
            {
                warn!(
                    error = %e,
                    order_id = %order_id,
                    "Material request auto-generation failed; order stands"
                );
            }
        }

        model_to_response(order)
    }

    /// Applies a status transition, rejecting anything outside the legal
    /// set, and synchronizes the machine inside the same transaction:
    /// entering `in_progress` marks the machine running; entering a
    /// terminal status marks it idle when no other order on the machine
    /// is in progress.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let old_status = parse_status(&order)?;
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot transition order from '{}' to '{}'",
                old_status, new_status
            )));
        }

        let machine_id = order.machine_id;
        let version = order.version;

        let mut active: OrderActiveModel = order.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        let machine_status =
            reconciliation::sync_machine_status(&txn, machine_id, order_id, new_status).await?;

        txn.commit().await?;

        info!(
            order_id = %order_id,
            old_status = %old_status,
            new_status = %new_status,
            "Order status updated"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status: old_status.to_string(),
                    new_status: new_status.to_string(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send status changed event");
            }
            if let Some(status) = machine_status {
                if let Err(e) = event_sender
                    .send(Event::MachineStatusChanged {
                        machine_id,
                        new_status: status.to_string(),
                    })
                    .await
                {
                    warn!(error = %e, machine_id = %machine_id, "Failed to send machine status event");
                }
            }
        }

        model_to_response(updated)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        model_to_response(order)
    }

    /// All orders placed against a machine, newest first.
    pub async fn orders_for_machine(
        &self,
        machine_id: Uuid,
    ) -> Result<Vec<OrderResponse>, ServiceError> {
        let db = &*self.db_pool;
        let orders = OrderEntity::find()
            .filter(production_order::Column::MachineId.eq(machine_id))
            .order_by_desc(production_order::Column::CreatedAt)
            .all(db)
            .await?;
        orders.into_iter().map(model_to_response).collect()
    }

    /// Repair sweep for a single order: recompute `completed_qty` from
    /// the live rows and rewrite it when drifted.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn reconcile(&self, order_id: Uuid) -> Result<CompletedQtyDrift, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await?;
        let drift = reconciliation::recompute_completed_qty(&txn, order_id).await?;
        txn.commit().await?;

        if drift.repaired {
            self.emit_drift_event(&drift).await;
        }
        Ok(drift)
    }

    /// Repair sweep over every order. Returns only the orders that had
    /// drifted.
    #[instrument(skip(self))]
    pub async fn reconcile_all(&self) -> Result<Vec<CompletedQtyDrift>, ServiceError> {
        let db = &*self.db_pool;
        let order_ids: Vec<Uuid> = OrderEntity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|order| order.id)
            .collect();

        let mut repaired = Vec::new();
        for order_id in order_ids {
            let txn = db.begin().await?;
            let drift = reconciliation::recompute_completed_qty(&txn, order_id).await?;
            txn.commit().await?;
            if drift.repaired {
                self.emit_drift_event(&drift).await;
                repaired.push(drift);
            }
        }

        info!(repaired = repaired.len(), "Reconciliation sweep finished");
        Ok(repaired)
    }

    async fn emit_drift_event(&self, drift: &CompletedQtyDrift) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::CompletedQtyDriftRepaired {
                    order_id: drift.order_id,
                    stored: drift.stored,
                    computed: drift.computed,
                })
                .await
            {
                error!(error = %e, order_id = %drift.order_id, "Failed to send drift event");
            }
        }
    }
}

fn parse_status(order: &OrderModel) -> Result<OrderStatus, ServiceError> {
    OrderStatus::from_str(&order.status).map_err(|_| {
        ServiceError::InternalError(format!(
            "Order {} has unknown status '{}'",
            order.id, order.status
        ))
    })
}

fn model_to_response(model: OrderModel) -> Result<OrderResponse, ServiceError> {
    let status = parse_status(&model)?;
    Ok(OrderResponse {
        id: model.id,
        machine_id: model.machine_id,
        product: model.product,
        quantity: model.quantity,
        completed_qty: model.completed_qty,
        remaining_qty: (model.quantity - model.completed_qty).max(0),
        status,
        color: model.color,
        mold_name: model.mold_name,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
        version: model.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(OrderStatus::Pending, OrderStatus::InProgress => true)]
    #[test_case(OrderStatus::Pending, OrderStatus::Completed => true)]
    #[test_case(OrderStatus::Pending, OrderStatus::Cancelled => true)]
    #[test_case(OrderStatus::InProgress, OrderStatus::Completed => true)]
    #[test_case(OrderStatus::InProgress, OrderStatus::Cancelled => true)]
    #[test_case(OrderStatus::InProgress, OrderStatus::Pending => false)]
    #[test_case(OrderStatus::Completed, OrderStatus::InProgress => false)]
    #[test_case(OrderStatus::Completed, OrderStatus::Pending => false)]
    #[test_case(OrderStatus::Cancelled, OrderStatus::InProgress => false)]
    #[test_case(OrderStatus::Completed, OrderStatus::Completed => false)]
    fn transition_table(from: OrderStatus, to: OrderStatus) -> bool {
        from.can_transition_to(to)
    }

    #[test]
    fn status_strings_are_snake_case() {
        assert_eq!(OrderStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            OrderStatus::from_str("in_progress").unwrap(),
            OrderStatus::InProgress
        );
    }

    #[test]
    fn remaining_qty_is_floored_at_zero() {
        let now = Utc::now();
        let model = OrderModel {
            id: Uuid::new_v4(),
            machine_id: Uuid::new_v4(),
            product: "Cup 200ml".into(),
            quantity: 100,
            completed_qty: 150,
            status: "in_progress".into(),
            color: None,
            mold_name: None,
            notes: None,
            created_at: now,
            updated_at: Some(now),
            version: 1,
        };
        let response = model_to_response(model).unwrap();
        assert_eq!(response.remaining_qty, 0);
    }

    #[test]
    fn unknown_stored_status_is_an_internal_error() {
        let now = Utc::now();
        let model = OrderModel {
            id: Uuid::new_v4(),
            machine_id: Uuid::new_v4(),
            product: "Cup 200ml".into(),
            quantity: 100,
            completed_qty: 0,
            status: "haywire".into(),
            color: None,
            mold_name: None,
            notes: None,
            created_at: now,
            updated_at: None,
            version: 1,
        };
        assert!(matches!(
            model_to_response(model),
            Err(ServiceError::InternalError(_))
        ));
    }
}
