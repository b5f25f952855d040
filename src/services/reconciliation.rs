//! Cross-aggregate coordination between shift-report rows, production
//! orders and machines.
//!
//! Every function here expects to run inside the caller's transaction so
//! the primary mutation and its side effect commit or roll back together.
//! `completed_qty` is only ever touched through the delta functions below;
//! they are single UPDATE statements, so concurrent row additions against
//! the same order serialize at the storage layer instead of racing a
//! read-modify-write in application code.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect,
};
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{machine, production_order, shift_report_row};
use crate::errors::ServiceError;
use crate::services::machines::MachineStatus;
use crate::services::orders::OrderStatus;

/// Result of one sweep pass over an order's derived counter
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompletedQtyDrift {
    pub order_id: Uuid,
    /// Counter value found on the order
    pub stored: i32,
    /// Live sum of actual_qty over the order's rows
    pub computed: i32,
    /// Whether the stored value was rewritten
    pub repaired: bool,
}

/// Adds a row's produced quantity to its order's counter.
///
/// `delta` is always >= 0; a zero delta is a no-op.
pub async fn apply_produced_delta<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    delta: i32,
) -> Result<(), ServiceError> {
    if delta == 0 {
        return Ok(());
    }

    let result = production_order::Entity::update_many()
        .col_expr(
            production_order::Column::CompletedQty,
            Expr::col(production_order::Column::CompletedQty).add(delta),
        )
        .filter(production_order::Column::Id.eq(order_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "Order {} not found for reconciliation",
            order_id
        )));
    }

    debug!(order_id = %order_id, delta = delta, "Applied produced delta");
    Ok(())
}

/// Reverses a previously applied delta, e.g. on row deletion.
///
/// The counter is floored at zero: correct reconciliation never drives it
/// negative, but corrupted data must not surface a negative completed
/// quantity.
pub async fn reverse_produced_delta<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    delta: i32,
) -> Result<(), ServiceError> {
    if delta == 0 {
        return Ok(());
    }

    let result = production_order::Entity::update_many()
        .col_expr(
            production_order::Column::CompletedQty,
            Expr::col(production_order::Column::CompletedQty).sub(delta),
        )
        .filter(production_order::Column::Id.eq(order_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "Order {} not found for reconciliation",
            order_id
        )));
    }

    // Clamp to the floor in a second atomic statement
    let clamped = production_order::Entity::update_many()
        .col_expr(production_order::Column::CompletedQty, Expr::value(0))
        .filter(production_order::Column::Id.eq(order_id))
        .filter(production_order::Column::CompletedQty.lt(0))
        .exec(conn)
        .await?;

    if clamped.rows_affected > 0 {
        warn!(
            order_id = %order_id,
            delta = delta,
            "Reversal drove completed_qty negative; clamped to zero"
        );
    }

    debug!(order_id = %order_id, delta = delta, "Reversed produced delta");
    Ok(())
}

/// Synchronizes the machine's operational status with an order status
/// transition. Returns the machine status written, if any.
pub async fn sync_machine_status<C: ConnectionTrait>(
    conn: &C,
    machine_id: Uuid,
    order_id: Uuid,
    new_order_status: OrderStatus,
) -> Result<Option<MachineStatus>, ServiceError> {
    let target = match new_order_status {
        OrderStatus::InProgress => Some(MachineStatus::Running),
        OrderStatus::Completed | OrderStatus::Cancelled => {
            // Idle only when nothing else runs on this machine
            let other_running = production_order::Entity::find()
                .filter(production_order::Column::MachineId.eq(machine_id))
                .filter(production_order::Column::Status.eq(OrderStatus::InProgress.to_string()))
                .filter(production_order::Column::Id.ne(order_id))
                .count(conn)
                .await?;
            if other_running == 0 {
                Some(MachineStatus::Idle)
            } else {
                None
            }
        }
        OrderStatus::Pending => None,
    };

    if let Some(status) = target {
        let result = machine::Entity::update_many()
            .col_expr(machine::Column::Status, Expr::value(status.to_string()))
            .col_expr(machine::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(machine::Column::Id.eq(machine_id))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Machine {} not found for status sync",
                machine_id
            )));
        }

        debug!(machine_id = %machine_id, status = %status, "Machine status synchronized");
    }

    Ok(target)
}

#[derive(FromQueryResult)]
struct ActualQtySum {
    total: Option<i64>,
}

/// Recomputes an order's `completed_qty` from the live set of linked
/// rows and repairs the stored counter when they disagree. This is the
/// on-demand safety net; the per-mutation transactions are the primary
/// consistency mechanism.
pub async fn recompute_completed_qty<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<CompletedQtyDrift, ServiceError> {
    let order = production_order::Entity::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

    let total = shift_report_row::Entity::find()
        .select_only()
        .column_as(shift_report_row::Column::ActualQty.sum(), "total")
        .filter(shift_report_row::Column::OrderId.eq(order_id))
        .into_model::<ActualQtySum>()
        .one(conn)
        .await?
        .and_then(|row| row.total)
        .unwrap_or(0);
    let computed = i32::try_from(total).map_err(|_| {
        ServiceError::InternalError(format!(
            "Row sum {} for order {} does not fit the counter",
            total, order_id
        ))
    })?;

    let stored = order.completed_qty;
    let repaired = stored != computed;

    if repaired {
        warn!(
            order_id = %order_id,
            stored = stored,
            computed = computed,
            "completed_qty drifted from live row sum; repairing"
        );
        production_order::Entity::update_many()
            .col_expr(production_order::Column::CompletedQty, Expr::value(computed))
            .col_expr(production_order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(production_order::Column::Id.eq(order_id))
            .exec(conn)
            .await?;
    }

    Ok(CompletedQtyDrift {
        order_id,
        stored,
        computed,
        repaired,
    })
}
