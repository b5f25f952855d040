use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::machine::{
    self, ActiveModel as MachineActiveModel, Entity as MachineEntity, Model as MachineModel,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Operational status of a machine
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Running,
    Idle,
    Maintenance,
    Changeover,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MachineResponse {
    pub id: Uuid,
    pub machine_number: i32,
    pub name: String,
    pub status: MachineStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Service managing machines. Status is normally driven by order status
/// transitions; `set_status` is the manual operator override.
#[derive(Clone)]
pub struct MachineService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl MachineService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self), fields(machine_number = machine_number))]
    pub async fn create_machine(
        &self,
        machine_number: i32,
        name: String,
    ) -> Result<MachineResponse, ServiceError> {
        if machine_number <= 0 {
            return Err(ServiceError::ValidationError(
                "Machine number must be positive".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Machine name is required".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let model = MachineActiveModel {
            id: Set(Uuid::new_v4()),
            machine_number: Set(machine_number),
            name: Set(name),
            status: Set(MachineStatus::Idle.to_string()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(db)
        .await?;

        info!(machine_id = %model.id, "Machine created");
        model_to_response(model)
    }

    pub async fn get_machine(&self, machine_id: Uuid) -> Result<MachineResponse, ServiceError> {
        let db = &*self.db_pool;
        let machine = MachineEntity::find_by_id(machine_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Machine {} not found", machine_id)))?;
        model_to_response(machine)
    }

    pub async fn list_machines(&self) -> Result<Vec<MachineResponse>, ServiceError> {
        let db = &*self.db_pool;
        let machines = MachineEntity::find()
            .order_by_asc(machine::Column::MachineNumber)
            .all(db)
            .await?;
        machines.into_iter().map(model_to_response).collect()
    }

    /// Manual status override, outside the order-driven synchronization.
    #[instrument(skip(self), fields(machine_id = %machine_id, new_status = %new_status))]
    pub async fn set_status(
        &self,
        machine_id: Uuid,
        new_status: MachineStatus,
    ) -> Result<MachineResponse, ServiceError> {
        let db = &*self.db_pool;

        let machine = MachineEntity::find_by_id(machine_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Machine {} not found", machine_id)))?;

        let mut active: MachineActiveModel = machine.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(machine_id = %machine_id, status = %new_status, "Machine status overridden");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MachineStatusChanged {
                    machine_id,
                    new_status: new_status.to_string(),
                })
                .await
            {
                tracing::warn!(error = %e, machine_id = %machine_id, "Failed to send machine status event");
            }
        }

        model_to_response(updated)
    }

    /// Looks a machine up by its display number.
    pub async fn find_by_number(
        &self,
        machine_number: i32,
    ) -> Result<Option<MachineResponse>, ServiceError> {
        let db = &*self.db_pool;
        let machine = MachineEntity::find()
            .filter(machine::Column::MachineNumber.eq(machine_number))
            .one(db)
            .await?;
        machine.map(model_to_response).transpose()
    }
}

fn model_to_response(model: MachineModel) -> Result<MachineResponse, ServiceError> {
    let status = MachineStatus::from_str(&model.status).map_err(|_| {
        ServiceError::InternalError(format!(
            "Machine {} has unknown status '{}'",
            model.id, model.status
        ))
    })?;
    Ok(MachineResponse {
        id: model.id,
        machine_number: model.machine_number,
        name: model.name,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_status_round_trips_through_strings() {
        for status in [
            MachineStatus::Running,
            MachineStatus::Idle,
            MachineStatus::Maintenance,
            MachineStatus::Changeover,
        ] {
            let parsed = MachineStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!(MachineStatus::from_str("exploded").is_err());
    }
}
