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
use crate::services::machines::MachineStatus;
use crate::{ApiResponse, AppState};

pub fn machine_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_machine))
        .route("/", get(list_machines))
        .route("/:id", get(get_machine))
        .route("/:id/status", put(set_machine_status))
        .route("/by-number/:machine_number", get(get_machine_by_number))
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateMachineRequest {
    pub machine_number: i32,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SetMachineStatusRequest {
    pub status: String,
}

async fn create_machine(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMachineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::MACHINES_WRITE)?;
    let machine = state
        .services
        .machines
        .create_machine(payload.machine_number, payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(machine))))
}

async fn list_machines(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::MACHINES_READ)?;
    let machines = state.services.machines.list_machines().await?;
    Ok(Json(ApiResponse::success(machines)))
}

async fn get_machine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::MACHINES_READ)?;
    let machine = state.services.machines.get_machine(id).await?;
    Ok(Json(ApiResponse::success(machine)))
}

async fn get_machine_by_number(
    State(state): State<AppState>,
    user: AuthUser,
    Path(machine_number): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::MACHINES_READ)?;
    let machine = state
        .services
        .machines
        .find_by_number(machine_number)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Machine number {} not found", machine_number))
        })?;
    Ok(Json(ApiResponse::success(machine)))
}

/// Manual operator override; order-driven synchronization is the normal
/// path.
async fn set_machine_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetMachineStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::MACHINES_WRITE)?;
    let status = MachineStatus::from_str(&payload.status).map_err(|_| {
        ServiceError::InvalidStatus(format!("Unknown machine status: {}", payload.status))
    })?;
    let machine = state.services.machines.set_status(id, status).await?;
    Ok(Json(ApiResponse::success(machine)))
}
