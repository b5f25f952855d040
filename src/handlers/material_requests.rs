use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{consts as perm, AuthUser};
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};

pub fn material_request_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_request))
        .route("/:id/recalculate", post(recalculate))
        .route("/by-order/:order_id", get(get_by_order))
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecalculateRequest {
    pub base_weight_kg: Decimal,
}

async fn get_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::MATERIALS_READ)?;
    let detail = state.services.material_requests.get_request(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// The material request auto-generated for an order, if any.
async fn get_by_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::MATERIALS_READ)?;
    let detail = state
        .services
        .material_requests
        .get_by_order(order_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("No material request for order {}", order_id))
        })?;
    Ok(Json(ApiResponse::success(detail)))
}

/// Set the batch base weight and recompute every item's kilogram
/// quantity from its stored percentage.
async fn recalculate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecalculateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::MATERIALS_WRITE)?;
    let detail = state
        .services
        .material_requests
        .recalculate(id, payload.base_weight_kg)
        .await?;
    Ok(Json(ApiResponse::success(detail)))
}
