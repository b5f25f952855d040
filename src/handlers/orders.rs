use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{consts as perm, AuthUser};
use crate::errors::ServiceError;
use crate::services::orders::{CreateOrderRequest, OrderStatus};
use crate::{ApiResponse, AppState};

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/reconcile", post(reconcile_all))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_order_status))
        .route("/:id/reconcile", post(reconcile_order))
        .route("/machine/:machine_id", get(orders_for_machine))
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

fn parse_status(raw: &str) -> Result<OrderStatus, ServiceError> {
    OrderStatus::from_str(raw).map_err(|_| {
        ServiceError::InvalidStatus(format!("Unknown order status: {}", raw))
    })
}

/// Create a production order. Auto-generates a material request when a
/// recipe matches the product.
async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::ORDERS_CREATE)?;
    let order = state.services.orders.create_order(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::ORDERS_READ)?;
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

async fn orders_for_machine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(machine_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::ORDERS_READ)?;
    let orders = state.services.orders.orders_for_machine(machine_id).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Apply a status transition; machine status is synchronized in the same
/// transaction.
async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::ORDERS_UPDATE)?;
    let status = parse_status(&payload.status)?;
    let order = state.services.orders.update_status(id, status).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// On-demand repair sweep for one order.
async fn reconcile_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::ORDERS_RECONCILE)?;
    let drift = state.services.orders.reconcile(id).await?;
    Ok(Json(ApiResponse::success(drift)))
}

/// On-demand repair sweep over all orders; returns the repaired ones.
async fn reconcile_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::ORDERS_RECONCILE)?;
    let repaired = state.services.orders.reconcile_all().await?;
    Ok(Json(ApiResponse::success(repaired)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_parse() {
        assert_eq!(parse_status("in_progress").unwrap(), OrderStatus::InProgress);
        assert_eq!(parse_status("cancelled").unwrap(), OrderStatus::Cancelled);
        assert!(matches!(
            parse_status("shipped"),
            Err(ServiceError::InvalidStatus(_))
        ));
    }
}
