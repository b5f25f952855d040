use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{consts as perm, AuthUser};
use crate::errors::ServiceError;
use crate::services::shift_reports::{AddRowRequest, CreateReportRequest, UpdateRowRequest};
use crate::{ApiResponse, AppState};

pub fn shift_report_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_report))
        .route("/:report_id/rows", post(add_row))
        .route("/rows/:id", get(get_row))
        .route("/rows/:id", put(update_row))
        .route("/rows/:id", delete(delete_row))
}

async fn create_report(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReportRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::REPORTS_WRITE)?;
    let report_id = state.services.shift_reports.create_report(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(json!({ "id": report_id }))),
    ))
}

/// Add a production row. Linking an order with a positive actual
/// quantity increments that order's completed quantity atomically.
async fn add_row(
    State(state): State<AppState>,
    user: AuthUser,
    Path(report_id): Path<Uuid>,
    Json(payload): Json<AddRowRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::REPORTS_WRITE)?;
    let row = state.services.shift_reports.add_row(report_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(row))))
}

async fn get_row(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::REPORTS_READ)?;
    let row = state.services.shift_reports.get_row(id).await?;
    Ok(Json(ApiResponse::success(row)))
}

async fn update_row(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRowRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::REPORTS_WRITE)?;
    let row = state.services.shift_reports.update_row(id, payload).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Delete a row, reversing its contribution to the linked order.
async fn delete_row(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::REPORTS_WRITE)?;
    state.services.shift_reports.delete_row(id).await?;
    Ok(Json(ApiResponse::success(json!({ "deleted": id }))))
}
