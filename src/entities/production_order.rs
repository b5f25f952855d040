use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "production_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub machine_id: Uuid,

    /// Free text, matched against recipe product names on creation
    #[validate(length(min = 1, max = 120))]
    pub product: String,

    /// Planned quantity
    pub quantity: i32,

    /// Derived counter. Always equals the sum of actual_qty over the
    /// live shift-report rows linked to this order; mutated only through
    /// the reconciliation module.
    pub completed_qty: i32,

    /// pending | in_progress | completed | cancelled
    pub status: String,

    pub color: Option<String>,
    pub mold_name: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::machine::Entity",
        from = "Column::MachineId",
        to = "super::machine::Column::Id"
    )]
    Machine,
    #[sea_orm(has_many = "super::shift_report_row::Entity")]
    ShiftReportRows,
    #[sea_orm(has_many = "super::material_request::Entity")]
    MaterialRequests,
}

impl Related<super::machine::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Machine.def()
    }
}

impl Related<super::shift_report_row::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShiftReportRows.def()
    }
}

impl Related<super::material_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
